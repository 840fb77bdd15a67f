//! Decoded Ethereum domain types shared by the codec, persistence, and core
//! crates: headers, transactions, receipts, trie nodes, and the raw
//! statediff payload they're all parsed out of.

pub mod block;
pub mod chainspec;
pub mod header;
pub mod keccak;
pub mod payload;
pub mod receipt;
pub mod signature;
pub mod state;
pub mod transaction;

pub use block::Block;
pub use chainspec::{ChainSpec, HardFork};
pub use header::Header;
pub use keccak::keccak256;
pub use payload::{CodeAndCodeHash, DiffPayload, StateDiffNode, StateObject, StorageDiffNode};
pub use receipt::{Log, PostTransactionState, Receipt};
pub use signature::{Signature, SignatureError};
pub use state::{Account, NodeType, StateNode, StorageNode};
pub use transaction::{
    AccessList, AccessListItem, Transaction, TransactionSigned, TxEip1559, TxEip2930, TxKind,
    TxLegacy,
};
