use alloy_primitives::{Bytes, B256, U256};
use alloy_rlp::{RlpDecodable, RlpEncodable};
use serde::{Deserialize, Serialize};

use crate::state::{NodeType, StateNode, StorageNode};

/// A single contract's code, keyed by its Keccak-256 hash, as attached to a
/// statediff payload whenever a CREATE or SELFDESTRUCT touches bytecode.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct CodeAndCodeHash {
    pub code_hash: B256,
    pub code: Bytes,
}

/// A storage-trie node as it appears nested under its owning state leaf in
/// `stateObjectRlp`. `leaf_key` is empty unless this node is itself a leaf.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct StorageDiffNode {
    pub path: Bytes,
    pub node_type: u8,
    pub node_rlp: Bytes,
    pub leaf_key: Bytes,
}

impl StorageDiffNode {
    pub fn into_storage_node(self, address: alloy_primitives::Address) -> StorageNode {
        StorageNode {
            address,
            path: self.path,
            node_type: NodeType::from_u8(self.node_type),
            node_rlp: self.node_rlp,
            leaf_key: leaf_key_from_bytes(&self.leaf_key),
        }
    }
}

/// A state-trie node as published in `stateObjectRlp`. Leaf nodes carry the
/// storage nodes touched under the account they decode to; branch/extension
/// nodes carry none.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct StateDiffNode {
    pub path: Bytes,
    pub node_type: u8,
    pub node_rlp: Bytes,
    pub leaf_key: Bytes,
    pub storage_address: Bytes,
    pub storage_nodes: Vec<StorageDiffNode>,
}

impl StateDiffNode {
    pub fn into_state_node(&self) -> StateNode {
        StateNode {
            path: self.path.clone(),
            node_type: NodeType::from_u8(self.node_type),
            node_rlp: self.node_rlp.clone(),
            leaf_key: leaf_key_from_bytes(&self.leaf_key),
        }
    }

    /// Empty for branch/extension/removed nodes, which carry no owning
    /// account and so no `storage_address` (`Address::from_slice` would
    /// panic on anything but exactly 20 bytes).
    pub fn storage_nodes(&self) -> Vec<StorageNode> {
        let Ok(address) = <[u8; 20]>::try_from(self.storage_address.as_ref()) else {
            return Vec::new();
        };
        let address = alloy_primitives::Address::from(address);
        self.storage_nodes.iter().cloned().map(|node| node.into_storage_node(address)).collect()
    }
}

fn leaf_key_from_bytes(bytes: &Bytes) -> Option<B256> {
    if bytes.is_empty() {
        None
    } else {
        Some(B256::from_slice(bytes))
    }
}

/// The decoded `stateObjectRlp` payload: `{blockNumber, blockHash, nodes[],
/// codeAndCodeHashes[]}` per §4.3 step 1.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct StateObject {
    pub block_number: u64,
    pub block_hash: B256,
    pub nodes: Vec<StateDiffNode>,
    pub code_and_code_hashes: Vec<CodeAndCodeHash>,
}

/// The raw per-block payload published over `statediff_stream` and returned
/// by `statediff_stateDiffAt`: everything the Block Transformer needs to
/// decompose a block into content-addressed objects and relational rows.
/// This struct itself is the JSON-RPC notification/response shape; each
/// field is independently RLP-encoded bytes, decoded in turn by the
/// transformer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffPayload {
    #[serde(rename = "blockRlp")]
    pub block_rlp: Bytes,
    #[serde(rename = "receiptsRlp")]
    pub receipts_rlp: Bytes,
    #[serde(rename = "stateObjectRlp")]
    pub state_object_rlp: Bytes,
    #[serde(rename = "totalDifficulty")]
    pub total_difficulty: U256,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use alloy_rlp::{Decodable, Encodable};

    #[test]
    fn state_object_round_trips_and_scopes_storage_nodes() {
        let storage = StorageDiffNode {
            path: Bytes::new(),
            node_type: 2,
            node_rlp: Bytes::new(),
            leaf_key: Bytes::from(B256::repeat_byte(0x3).to_vec()),
        };
        let state_node = StateDiffNode {
            path: Bytes::new(),
            node_type: 2,
            node_rlp: Bytes::new(),
            leaf_key: Bytes::from(B256::repeat_byte(0x1).to_vec()),
            storage_address: Bytes::from(Address::repeat_byte(0x2).to_vec()),
            storage_nodes: vec![storage],
        };
        let object = StateObject {
            block_number: 1,
            block_hash: B256::repeat_byte(0x9),
            nodes: vec![state_node],
            code_and_code_hashes: vec![],
        };

        let mut buf = Vec::new();
        object.encode(&mut buf);
        let decoded = StateObject::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, object);

        let storage_nodes = decoded.nodes[0].storage_nodes();
        assert_eq!(storage_nodes.len(), 1);
        assert_eq!(storage_nodes[0].address, Address::repeat_byte(0x2));
        assert_eq!(storage_nodes[0].leaf_key, Some(B256::repeat_byte(0x3)));
    }

    #[test]
    fn non_leaf_node_has_no_leaf_key() {
        let node = StateDiffNode {
            path: Bytes::new(),
            node_type: 1,
            node_rlp: Bytes::new(),
            leaf_key: Bytes::new(),
            storage_address: Bytes::new(),
            storage_nodes: vec![],
        };
        assert_eq!(node.into_state_node().leaf_key, None);
    }

    #[test]
    fn non_leaf_node_storage_nodes_is_empty_and_does_not_panic() {
        let node = StateDiffNode {
            path: Bytes::new(),
            node_type: 1,
            node_rlp: Bytes::new(),
            leaf_key: Bytes::new(),
            storage_address: Bytes::new(),
            storage_nodes: vec![],
        };
        assert_eq!(node.storage_nodes(), vec![]);
    }
}
