use std::time::Duration;

use jsonrpsee::{
    core::client::ClientT,
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
    types::BatchRequestBuilder,
};

use indexer_primitives::DiffPayload;

use crate::{error::RpcError, node_info::NodeInfo};

/// The minimum HTTP timeout spec.md §5 requires for the fetcher.
pub const MIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Batched request/response client for `statediff_stateDiffAt`. Used by
/// the worker pool's fetch step and by backfill/resync.
pub struct Fetcher {
    client: HttpClient,
}

impl Fetcher {
    pub fn connect(http_url: &str, timeout: Duration) -> Result<Self, RpcError> {
        let timeout = timeout.max(MIN_TIMEOUT);
        let client = HttpClientBuilder::default().request_timeout(timeout).build(http_url)?;
        Ok(Self { client })
    }

    /// Fetches one payload per height, in order, via a single JSON-RPC
    /// batch request (one HTTP round trip for the whole `heights` slice).
    /// A height that fails individually fails the whole batch; the worker
    /// pool logs and skips it per §4.4.
    pub async fn fetch_batch(&self, heights: &[u64]) -> Result<Vec<DiffPayload>, RpcError> {
        let mut batch = BatchRequestBuilder::new();
        for &height in heights {
            batch.insert("statediff_stateDiffAt", rpc_params![height])?;
        }

        let response = self.client.batch_request::<DiffPayload>(batch).await?;
        response.into_iter().map(|item| item.map_err(RpcError::from)).collect()
    }

    /// The node-identifying call of §6, used once at startup to populate
    /// `NodeInfo`.
    pub async fn node_info(&self) -> Result<NodeInfo, RpcError> {
        Ok(self.client.request("statediff_nodeInfo", rpc_params![]).await?)
    }
}
