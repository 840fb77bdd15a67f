//! `resync` — one-shot bounded re-index over an explicit range, optionally
//! resetting validation counters and clearing prior data first.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use indexer_config::{Config, ResyncType};
use indexer_core::{ResyncConfig, ResyncCoordinator};
use indexer_db::{Cleaner, DataKind, Gateway, Range};
use indexer_metrics::Metrics;
use indexer_primitives::ChainSpec;
use indexer_rpc::Fetcher;

use crate::commands::{database_url, node_info_row, pool_config};

pub async fn run(config: &Config) -> eyre::Result<()> {
    let metrics = Metrics::new();
    let pool = Gateway::connect(
        &database_url(&config.database),
        pool_config(&config.database, &config.database.resync),
    )
    .await?;

    let fetcher = Arc::new(Fetcher::connect(&config.ethereum.http_path, config.resync.timeout)?);
    let node_info = fetcher.node_info().await?;

    let cleaner = Cleaner::new(pool.clone());
    let gateway =
        Arc::new(Gateway::ensure_node_info(pool, node_info_row(node_info), metrics.clone()).await?);

    let coordinator = ResyncCoordinator::new(cleaner, fetcher, gateway, metrics, ChainSpec::MAINNET);

    let kind = match config.resync.kind {
        ResyncType::Full => DataKind::Full,
        ResyncType::Headers => DataKind::Headers,
        ResyncType::Transactions => DataKind::Transactions,
        ResyncType::Receipts => DataKind::Receipts,
        ResyncType::State => DataKind::State,
        ResyncType::Storage => DataKind::Storage,
    };

    coordinator
        .run(
            ResyncConfig {
                ranges: vec![Range {
                    start: config.resync.start as i64,
                    stop: config.resync.stop as i64,
                }],
                kind,
                batch_size: config.resync.batch_size,
                workers: config.resync.workers.max(1),
                reset_validation: config.resync.reset_validation,
                clear_old_cache: config.resync.clear_old_cache,
            },
            CancellationToken::new(),
        )
        .await?;

    Ok(())
}
