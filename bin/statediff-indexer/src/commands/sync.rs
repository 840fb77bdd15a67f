//! `sync` — head tracking: connects to the upstream node and relational
//! store, then runs the Live Subscriber until interrupted.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use indexer_config::Config;
use indexer_core::live;
use indexer_db::Gateway;
use indexer_metrics::Metrics;
use indexer_primitives::ChainSpec;
use indexer_rpc::{fetcher::MIN_TIMEOUT, Fetcher};

use crate::commands::{database_url, node_info_row, pool_config};

pub async fn run(config: &Config) -> eyre::Result<()> {
    let metrics = Metrics::new();
    let pool =
        Gateway::connect(&database_url(&config.database), pool_config(&config.database, &config.database.sync))
            .await?;

    let fetcher = Fetcher::connect(&config.ethereum.http_path, MIN_TIMEOUT)?;
    let node_info = fetcher.node_info().await?;

    let gateway =
        Arc::new(Gateway::ensure_node_info(pool, node_info_row(node_info), metrics.clone()).await?);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        shutdown.cancel();
    });

    let workers = config.sync.workers.max(1);
    live::run(
        &config.ethereum.ws_path,
        workers * 4,
        workers,
        gateway,
        metrics,
        ChainSpec::MAINNET,
        cancel,
    )
    .await?;

    Ok(())
}
