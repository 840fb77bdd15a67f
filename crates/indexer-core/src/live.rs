//! The Live Subscriber of §4.5: opens the push-style `statediff_stream`
//! subscription and forwards every payload into the drop-oldest ring
//! channel a pool of workers drains directly, with no fetch step since the
//! payload already arrived over the wire.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use indexer_db::Gateway;
use indexer_metrics::Metrics;
use indexer_primitives::ChainSpec;
use indexer_rpc::{RpcError, Subscriber, SubscriptionParams};

use crate::{ring, worker};

/// Runs the live-sync pipeline until `cancel` fires or the subscription
/// drops. Reconnect policy belongs to the caller: this returns on the first
/// subscription failure rather than looping internally.
pub async fn run(
    ws_url: &str,
    channel_capacity: usize,
    worker_count: usize,
    gateway: Arc<Gateway>,
    metrics: Metrics,
    chain_spec: ChainSpec,
    cancel: CancellationToken,
) -> Result<(), RpcError> {
    let subscriber = Subscriber::connect(ws_url).await?;
    let (sender, receiver) = ring::channel(channel_capacity.max(1));

    let pool = worker::spawn_live(worker_count, receiver, gateway, metrics, chain_spec, cancel.clone());

    let result = drain(&subscriber, sender, &cancel).await;

    cancel.cancel();
    pool.join().await;
    result
}

async fn drain(
    subscriber: &Subscriber,
    sender: ring::RingSender<indexer_primitives::DiffPayload>,
    cancel: &CancellationToken,
) -> Result<(), RpcError> {
    let mut stream = subscriber.subscribe(SubscriptionParams::default()).await?;

    loop {
        tokio::select! {
            item = stream.next() => match item {
                Some(Ok(payload)) => sender.send(payload).await,
                Some(Err(error)) => tracing::error!(%error, "statediff subscription item error"),
                None => {
                    tracing::warn!("statediff subscription dropped");
                    return Err(RpcError::SubscriptionDropped);
                }
            },
            _ = cancel.cancelled() => return Ok(()),
        }
    }
}
