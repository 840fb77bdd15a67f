//! The Backfill Coordinator of §4.6/§4.7: on a fixed tick, asks the Gap
//! Detector for missing or under-validated ranges, bins each into
//! `batch_size`-sized chunks, and drives a fresh worker pool over them.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use indexer_db::{DbGap, GapDetector, Gateway};
use indexer_metrics::Metrics;
use indexer_primitives::ChainSpec;
use indexer_rpc::Fetcher;

use crate::{error::BackfillError, worker};

/// Tuning for one coordinator instance, sourced from `backfill.*` config.
#[derive(Debug, Clone, Copy)]
pub struct BackfillConfig {
    pub frequency: Duration,
    pub batch_size: u64,
    pub workers: usize,
    pub validation_level: i32,
}

pub struct BackfillCoordinator {
    gap_detector: GapDetector,
    fetcher: Arc<Fetcher>,
    gateway: Arc<Gateway>,
    metrics: Metrics,
    chain_spec: ChainSpec,
}

impl BackfillCoordinator {
    pub fn new(
        gap_detector: GapDetector,
        fetcher: Arc<Fetcher>,
        gateway: Arc<Gateway>,
        metrics: Metrics,
        chain_spec: ChainSpec,
    ) -> Self {
        Self { gap_detector, fetcher, gateway, metrics, chain_spec }
    }

    /// Runs passes on `config.frequency` until `cancel` fires. A failed pass
    /// is logged and the ticker continues; one bad gap scan never stops
    /// backfill for good.
    pub async fn run(&self, config: BackfillConfig, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(config.frequency);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(error) = self.run_once(&config, &cancel).await {
                        tracing::error!(%error, "backfill pass failed");
                    }
                }
                _ = cancel.cancelled() => {
                    tracing::info!("backfill coordinator shutting down");
                    return;
                }
            }
        }
    }

    async fn run_once(
        &self,
        config: &BackfillConfig,
        cancel: &CancellationToken,
    ) -> Result<(), BackfillError> {
        let gaps = self.gap_detector.retrieve_gaps(config.validation_level).await?;
        if gaps.is_empty() {
            return Ok(());
        }

        let (dispatcher, pool) = worker::spawn(
            config.workers,
            config.workers.max(1) * 2,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.gateway),
            self.metrics.clone(),
            self.chain_spec,
        );

        'gaps: for gap in &gaps {
            for batch in bins(*gap, config.batch_size) {
                if cancel.is_cancelled() {
                    break 'gaps;
                }
                dispatcher.send_batch(batch).await;
            }
        }

        dispatcher.close(config.workers).await;
        pool.join().await;
        Ok(())
    }
}

/// Splits an inclusive `[start, stop]` gap into ascending `batch_size`-sized
/// height batches, the last one possibly shorter.
fn bins(gap: DbGap, batch_size: u64) -> Vec<Vec<u64>> {
    let batch_size = batch_size.max(1);
    let start = gap.start as u64;
    let stop = gap.stop as u64;

    let mut batches = Vec::new();
    let mut height = start;
    while height <= stop {
        let bin_stop = (height + batch_size - 1).min(stop);
        batches.push((height..=bin_stop).collect());
        height = bin_stop + 1;
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_cover_the_gap_exactly_once() {
        let gap = DbGap { start: 5, stop: 12 };
        let batches = bins(gap, 4);
        let flattened: Vec<u64> = batches.into_iter().flatten().collect();
        assert_eq!(flattened, (5..=12).collect::<Vec<u64>>());
    }

    #[test]
    fn single_height_gap_yields_one_batch_of_one() {
        let gap = DbGap { start: 7, stop: 7 };
        assert_eq!(bins(gap, 100), vec![vec![7]]);
    }
}
