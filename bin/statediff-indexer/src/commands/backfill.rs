//! `backfill` — runs the Backfill Coordinator on its configured tick until
//! interrupted.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use indexer_config::Config;
use indexer_core::{BackfillConfig, BackfillCoordinator};
use indexer_db::{GapDetector, Gateway};
use indexer_metrics::Metrics;
use indexer_primitives::ChainSpec;
use indexer_rpc::Fetcher;

use crate::commands::{database_url, node_info_row, pool_config};

pub async fn run(config: &Config) -> eyre::Result<()> {
    let metrics = Metrics::new();
    let pool = Gateway::connect(
        &database_url(&config.database),
        pool_config(&config.database, &config.database.backfill),
    )
    .await?;

    let fetcher = Arc::new(Fetcher::connect(&config.ethereum.http_path, config.backfill.timeout)?);
    let node_info = fetcher.node_info().await?;

    let gap_detector = GapDetector::new(pool.clone());
    let gateway =
        Arc::new(Gateway::ensure_node_info(pool, node_info_row(node_info), metrics.clone()).await?);

    let coordinator = BackfillCoordinator::new(gap_detector, fetcher, gateway, metrics, ChainSpec::MAINNET);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        shutdown.cancel();
    });

    coordinator
        .run(
            BackfillConfig {
                frequency: config.backfill.frequency,
                batch_size: config.backfill.batch_size,
                workers: config.backfill.workers.max(1),
                validation_level: config.backfill.validation_level,
            },
            cancel,
        )
        .await;

    Ok(())
}
