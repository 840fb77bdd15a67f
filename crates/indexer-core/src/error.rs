use indexer_primitives::SignatureError;

/// Errors the Block Transformer can return. Every variant aborts the
/// current payload's transaction; the caller logs and moves to the next
/// work item, per §4.3's error semantics.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("decoding block rlp: {0}")]
    DecodeBlock(alloy_rlp::Error),
    #[error("decoding receipts rlp: {0}")]
    DecodeReceipts(alloy_rlp::Error),
    #[error("decoding state object rlp: {0}")]
    DecodeStateObject(alloy_rlp::Error),
    #[error("block has {txs} transactions but {receipts} receipts")]
    TransactionReceiptCountMismatch { txs: usize, receipts: usize },
    #[error(
        "trie node counts disagree: {tx_nodes} tx nodes, {tx_trie_nodes} tx trie nodes, \
         {receipt_nodes} receipt nodes, {receipt_trie_nodes} receipt trie nodes"
    )]
    TrieNodeCountMismatch {
        tx_nodes: usize,
        tx_trie_nodes: usize,
        receipt_nodes: usize,
        receipt_trie_nodes: usize,
    },
    #[error("decoding state leaf account: {0}")]
    InvalidAccountLeaf(alloy_rlp::Error),
    #[error("recovering transaction sender: {0}")]
    Signature(#[from] SignatureError),
    #[error("content-addressing: {0}")]
    Codec(#[from] indexer_codec::CodecError),
    #[error("persistence gateway: {0}")]
    Gateway(#[from] indexer_db::GatewayError),
}

#[derive(Debug, thiserror::Error)]
pub enum BackfillError {
    #[error("gap detection failed: {0}")]
    GapDetection(#[from] sqlx::Error),
    #[error("fetch failed: {0}")]
    Fetch(#[from] indexer_rpc::RpcError),
}

#[derive(Debug, thiserror::Error)]
pub enum ResyncError {
    #[error(transparent)]
    Clean(#[from] indexer_db::CleanError),
    #[error(transparent)]
    Backfill(#[from] BackfillError),
}
