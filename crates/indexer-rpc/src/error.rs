#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("jsonrpsee transport error: {0}")]
    Transport(#[from] jsonrpsee::core::ClientError),
    #[error("failed to serialize batch request params: {0}")]
    Params(#[from] serde_json::Error),
    #[error("batch item failed: {0}")]
    BatchItem(#[from] jsonrpsee::types::ErrorObject<'static>),
    #[error("subscription dropped")]
    SubscriptionDropped,
}
