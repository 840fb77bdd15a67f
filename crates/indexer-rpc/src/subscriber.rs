use std::time::Duration;

use futures_util::{Stream, StreamExt};
use jsonrpsee::{
    core::client::{Subscription, SubscriptionClientT},
    rpc_params,
    ws_client::{WsClient, WsClientBuilder},
};
use serde::Serialize;

use indexer_primitives::DiffPayload;

use crate::error::RpcError;

/// Parameters for the `statediff_stream` subscription, fixed per §6: the
/// indexer always wants the block, total difficulty, receipts, and
/// intermediate trie nodes on both tries.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SubscriptionParams {
    #[serde(rename = "IncludeBlock")]
    pub include_block: bool,
    #[serde(rename = "IncludeTD")]
    pub include_td: bool,
    #[serde(rename = "IncludeReceipts")]
    pub include_receipts: bool,
    #[serde(rename = "IntermediateStorageNodes")]
    pub intermediate_storage_nodes: bool,
    #[serde(rename = "IntermediateStateNodes")]
    pub intermediate_state_nodes: bool,
}

impl Default for SubscriptionParams {
    fn default() -> Self {
        Self {
            include_block: true,
            include_td: true,
            include_receipts: true,
            intermediate_storage_nodes: true,
            intermediate_state_nodes: true,
        }
    }
}

/// Opens and holds the duplex `statediff_stream` subscription. The Live
/// Subscriber (`indexer-core`) drains this and forwards into the
/// ring-buffer work channel.
pub struct Subscriber {
    client: WsClient,
}

impl Subscriber {
    pub async fn connect(ws_url: &str) -> Result<Self, RpcError> {
        let client = WsClientBuilder::default()
            .connection_timeout(Duration::from_secs(15))
            .build(ws_url)
            .await?;
        Ok(Self { client })
    }

    pub async fn subscribe(
        &self,
        params: SubscriptionParams,
    ) -> Result<impl Stream<Item = Result<DiffPayload, RpcError>> + '_, RpcError> {
        let subscription: Subscription<DiffPayload> = self
            .client
            .subscribe(
                "statediff_stream",
                rpc_params![params],
                "statediff_unsubscribe",
            )
            .await?;

        Ok(subscription.map(|item| item.map_err(RpcError::from)))
    }
}
