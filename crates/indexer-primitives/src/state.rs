use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_rlp::{RlpDecodable, RlpEncodable};

/// The closed set of trie node shapes a statediff payload can describe.
/// `Removed` marks a node deleted between the parent and this block's state
/// root; it carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Unknown,
    Branch,
    Leaf,
    Extension,
    Removed,
}

impl NodeType {
    /// Matches the small-int tags the upstream statediffing geth fork emits.
    pub fn from_u8(tag: u8) -> Self {
        match tag {
            1 => NodeType::Branch,
            2 => NodeType::Leaf,
            3 => NodeType::Extension,
            4 => NodeType::Removed,
            _ => NodeType::Unknown,
        }
    }
}

/// A single node in the state trie diff: the path it sits at, its raw RLP
/// encoding (content-addressed separately), and the leaf key if this is a
/// leaf node (the account's Keccak-256 key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateNode {
    pub path: Bytes,
    pub node_type: NodeType,
    pub node_rlp: Bytes,
    pub leaf_key: Option<B256>,
}

/// A single node in a contract's storage trie diff, scoped to the account
/// that owns the storage slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageNode {
    pub address: Address,
    pub path: Bytes,
    pub node_type: NodeType,
    pub node_rlp: Bytes,
    pub leaf_key: Option<B256>,
}

/// A decoded account leaf: nonce, balance, storage trie root, and code hash,
/// as RLP-encoded at an account's leaf node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct Account {
    pub nonce: u64,
    pub balance: U256,
    pub storage_root: B256,
    pub code_hash: B256,
}

impl Account {
    /// The Keccak-256 of an account's bytecode, for accounts with no code
    /// (EOAs), per EIP-1052's `EMPTY_CODE_HASH`.
    pub const EMPTY_CODE_HASH: B256 = B256::new([
        0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03,
        0xc0, 0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85,
        0xa4, 0x70,
    ]);

    pub fn has_code(&self) -> bool {
        self.code_hash != Self::EMPTY_CODE_HASH && self.code_hash != B256::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_rlp::{Decodable, Encodable};

    #[test]
    fn account_round_trips_through_rlp() {
        let account = Account {
            nonce: 1,
            balance: U256::from(100u64),
            storage_root: B256::repeat_byte(0x1),
            code_hash: Account::EMPTY_CODE_HASH,
        };
        let mut buf = Vec::new();
        account.encode(&mut buf);
        let decoded = Account::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, account);
        assert!(!decoded.has_code());
    }

    #[test]
    fn node_type_maps_known_tags() {
        assert_eq!(NodeType::from_u8(1), NodeType::Branch);
        assert_eq!(NodeType::from_u8(2), NodeType::Leaf);
        assert_eq!(NodeType::from_u8(3), NodeType::Extension);
        assert_eq!(NodeType::from_u8(4), NodeType::Removed);
        assert_eq!(NodeType::from_u8(99), NodeType::Unknown);
    }
}
