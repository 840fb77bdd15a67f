//! The Resync Coordinator of §4.7/§4.8: a one-shot pass over explicit
//! ranges, optionally resetting validation counters and clearing prior data
//! first, then re-fetching and re-transforming every height in range.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use indexer_db::{Cleaner, CleanError, DataKind, Gateway, Range};
use indexer_metrics::Metrics;
use indexer_primitives::ChainSpec;
use indexer_rpc::Fetcher;

use crate::{error::ResyncError, worker};

/// One resync invocation's parameters, sourced from the `resync` CLI
/// subcommand or `util` equivalent.
#[derive(Debug, Clone)]
pub struct ResyncConfig {
    pub ranges: Vec<Range>,
    pub kind: DataKind,
    pub batch_size: u64,
    pub workers: usize,
    pub reset_validation: bool,
    pub clear_old_cache: bool,
}

pub struct ResyncCoordinator {
    cleaner: Cleaner,
    fetcher: Arc<Fetcher>,
    gateway: Arc<Gateway>,
    metrics: Metrics,
    chain_spec: ChainSpec,
}

impl ResyncCoordinator {
    pub fn new(
        cleaner: Cleaner,
        fetcher: Arc<Fetcher>,
        gateway: Arc<Gateway>,
        metrics: Metrics,
        chain_spec: ChainSpec,
    ) -> Self {
        Self { cleaner, fetcher, gateway, metrics, chain_spec }
    }

    pub async fn run(&self, config: ResyncConfig, cancel: CancellationToken) -> Result<(), ResyncError> {
        let ranges: Vec<Range> = config
            .ranges
            .into_iter()
            .filter(|range| {
                let ok = range.stop >= range.start;
                if !ok {
                    tracing::warn!(
                        start = range.start,
                        stop = range.stop,
                        "skipping resync range with stop < start"
                    );
                }
                ok
            })
            .collect();

        for range in &ranges {
            if config.reset_validation {
                self.cleaner.reset_validation(*range).await.map_err(CleanError::from)?;
            }
            if config.clear_old_cache {
                self.cleaner.clean(*range, config.kind).await?;
            }
        }

        let (dispatcher, pool) = worker::spawn(
            config.workers,
            config.workers.max(1) * 2,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.gateway),
            self.metrics.clone(),
            self.chain_spec,
        );

        'ranges: for range in &ranges {
            let batch_size = config.batch_size.max(1);
            let mut height = range.start as u64;
            let stop = range.stop as u64;
            while height <= stop {
                if cancel.is_cancelled() {
                    break 'ranges;
                }
                let bin_stop = (height + batch_size - 1).min(stop);
                dispatcher.send_batch((height..=bin_stop).collect()).await;
                height = bin_stop + 1;
            }
        }

        dispatcher.close(config.workers).await;
        pool.join().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_with_stop_before_start_is_detected() {
        let range = Range { start: 10, stop: 4 };
        assert!(range.stop < range.start);
    }
}
