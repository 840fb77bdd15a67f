//! Row shapes accepted by the gateway's upsert methods. These are the
//! database-facing projection of the domain types in `indexer-primitives` —
//! the transformer builds one of these per entity, already normalized
//! (zero addresses and zero hashes turned into the empty string) per
//! §3's identity rules.

use bigdecimal::BigDecimal;

pub struct NodeInfoRow {
    pub genesis_block: String,
    pub network_id: String,
    pub node_id: String,
    pub client_name: String,
    pub chain_id: i64,
}

pub struct HeaderRow {
    pub block_number: i64,
    pub block_hash: String,
    pub parent_hash: String,
    pub cid: String,
    pub mh_key: String,
    pub total_difficulty: BigDecimal,
    pub reward: BigDecimal,
    pub state_root: String,
    pub tx_root: String,
    pub receipt_root: String,
    pub uncle_root: String,
    pub bloom: Vec<u8>,
    pub timestamp: BigDecimal,
}

pub struct UncleRow {
    pub block_hash: String,
    pub parent_hash: String,
    pub cid: String,
    pub mh_key: String,
    pub reward: BigDecimal,
}

pub struct TransactionRow {
    pub tx_hash: String,
    pub index: i64,
    pub src: String,
    pub dst: String,
    pub cid: String,
    pub mh_key: String,
    pub data: Vec<u8>,
}

pub struct ReceiptRow {
    pub cid: String,
    pub mh_key: String,
    pub contract: String,
    pub contract_hash: String,
    pub topic0s: Vec<String>,
    pub topic1s: Vec<String>,
    pub topic2s: Vec<String>,
    pub topic3s: Vec<String>,
    pub log_contracts: Vec<String>,
    pub post_state: Option<String>,
    pub post_status: Option<i32>,
}

pub struct StateNodeRow {
    pub state_path: Vec<u8>,
    pub cid: String,
    pub mh_key: String,
    pub state_leaf_key: String,
    pub node_type: i32,
    pub diff: bool,
}

pub struct StateAccountRow {
    pub balance: BigDecimal,
    pub nonce: i64,
    pub code_hash: String,
    pub storage_root: String,
}

pub struct StorageNodeRow {
    pub storage_path: Vec<u8>,
    pub cid: String,
    pub mh_key: String,
    pub storage_leaf_key: String,
    pub node_type: i32,
    pub diff: bool,
}
