//! The Worker Pool & Dispatcher of §4.4: a fixed pool of `W` workers
//! draining one shared work channel, each fetching and transforming its
//! batches in order. Two flavors share this module: a synchronous,
//! quit-terminated pool for backfill and resync, and a cancellation-driven
//! pool for the live subscriber, which hands workers already-decoded
//! payloads instead of heights to fetch.

use std::sync::Arc;

use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use indexer_db::Gateway;
use indexer_metrics::Metrics;
use indexer_primitives::{ChainSpec, DiffPayload};
use indexer_rpc::Fetcher;

use crate::{ring::RingReceiver, transformer};

/// A contiguous batch of heights to fetch and transform together.
pub type Batch = Vec<u64>;

enum WorkMessage {
    Batch(Batch),
    Quit,
}

/// The dispatcher side of the synchronous work channel. Cloning shares the
/// same underlying channel; every clone can send batches, but only the
/// owning coordinator should call `close`.
#[derive(Clone)]
pub struct Dispatcher {
    sender: mpsc::Sender<WorkMessage>,
}

impl Dispatcher {
    /// Enqueues a batch, blocking if every worker is busy and the channel is
    /// full — the pool's only backpressure mechanism.
    pub async fn send_batch(&self, batch: Batch) {
        let _ = self.sender.send(WorkMessage::Batch(batch)).await;
    }

    /// Sends exactly `worker_count` quit messages, one per worker, so every
    /// worker observes its own quit after draining the batches ahead of it.
    pub async fn close(&self, worker_count: usize) {
        for _ in 0..worker_count {
            let _ = self.sender.send(WorkMessage::Quit).await;
        }
    }
}

/// A spawned set of worker tasks. Dropping this without calling `join` is
/// fine — the tasks keep running detached — but callers that need to know
/// when a pass has fully drained should always `join`.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub async fn join(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

/// Spawns `worker_count` workers sharing one synchronous batch channel with
/// capacity `channel_capacity`. Each worker calls the fetcher once per
/// batch, then invokes the transformer on every payload in order.
pub fn spawn(
    worker_count: usize,
    channel_capacity: usize,
    fetcher: Arc<Fetcher>,
    gateway: Arc<Gateway>,
    metrics: Metrics,
    chain_spec: ChainSpec,
) -> (Dispatcher, WorkerPool) {
    let (sender, receiver) = mpsc::channel(channel_capacity.max(1));
    let receiver = Arc::new(Mutex::new(receiver));

    let handles = (0..worker_count)
        .map(|worker_id| {
            let receiver = Arc::clone(&receiver);
            let fetcher = Arc::clone(&fetcher);
            let gateway = Arc::clone(&gateway);
            let metrics = metrics.clone();
            tokio::spawn(async move {
                run_batch_worker(worker_id, receiver, fetcher, gateway, metrics, chain_spec).await;
            })
        })
        .collect();

    (Dispatcher { sender }, WorkerPool { handles })
}

async fn run_batch_worker(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<WorkMessage>>>,
    fetcher: Arc<Fetcher>,
    gateway: Arc<Gateway>,
    metrics: Metrics,
    chain_spec: ChainSpec,
) {
    loop {
        let message = receiver.lock().await.recv().await;
        match message {
            None | Some(WorkMessage::Quit) => {
                tracing::debug!(worker_id, "batch worker exiting");
                return;
            }
            Some(WorkMessage::Batch(heights)) => {
                let payloads = match fetcher.fetch_batch(&heights).await {
                    Ok(payloads) => payloads,
                    Err(error) => {
                        tracing::error!(worker_id, %error, ?heights, "batch fetch failed, skipping");
                        continue;
                    }
                };

                for payload in payloads {
                    if let Err(error) =
                        transformer::transform(worker_id, payload, &gateway, &metrics, &chain_spec).await
                    {
                        tracing::error!(worker_id, %error, "payload transform failed, skipping");
                    }
                }
            }
        }
    }
}

/// Spawns `worker_count` workers draining `receiver` directly — used by the
/// live subscriber, which already has decoded payloads in hand and has no
/// fetch step to run. Workers exit once `cancel` fires and the receiver has
/// drained.
pub fn spawn_live(
    worker_count: usize,
    receiver: RingReceiver<DiffPayload>,
    gateway: Arc<Gateway>,
    metrics: Metrics,
    chain_spec: ChainSpec,
    cancel: CancellationToken,
) -> WorkerPool {
    let receiver = Arc::new(Mutex::new(receiver));

    let handles = (0..worker_count)
        .map(|worker_id| {
            let receiver = Arc::clone(&receiver);
            let gateway = Arc::clone(&gateway);
            let metrics = metrics.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                loop {
                    let payload = receiver.lock().await.recv(&cancel).await;
                    match payload {
                        None => {
                            tracing::debug!(worker_id, "live worker exiting");
                            return;
                        }
                        Some(payload) => {
                            if let Err(error) =
                                transformer::transform(worker_id, payload, &gateway, &metrics, &chain_spec)
                                    .await
                            {
                                tracing::error!(worker_id, %error, "payload transform failed, skipping");
                            }
                        }
                    }
                }
            })
        })
        .collect();

    WorkerPool { handles }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn close_sends_exactly_worker_count_quits() {
        let (sender, mut receiver) = mpsc::channel(8);
        let dispatcher = Dispatcher { sender };
        dispatcher.close(3).await;

        let mut quits = 0;
        while let Ok(message) = receiver.try_recv() {
            if matches!(message, WorkMessage::Quit) {
                quits += 1;
            }
        }
        assert_eq!(quits, 3);
    }
}
