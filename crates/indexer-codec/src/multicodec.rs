//! The multicodec tags this indexer ever emits. Values are the Ethereum
//! IPLD block-layer codecs from the multiformats table; `RAW` is used for
//! contract code, which has no block-layer meaning of its own.

pub const ETH_BLOCK: u64 = 0x90;
pub const ETH_BLOCK_LIST: u64 = 0x91;
pub const ETH_TX_TRIE: u64 = 0x92;
pub const ETH_TX: u64 = 0x93;
pub const ETH_TX_RECEIPT_TRIE: u64 = 0x94;
pub const ETH_TX_RECEIPT: u64 = 0x95;
pub const ETH_STATE_TRIE: u64 = 0x96;
pub const ETH_ACCOUNT_SNAPSHOT: u64 = 0x97;
pub const ETH_STORAGE_TRIE: u64 = 0x98;
pub const RAW: u64 = 0x55;

/// The multicodec used by Keccak-256 in the multihash table.
pub const KECCAK_256: u64 = 0x1b;
