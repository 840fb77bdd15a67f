//! Raw encoders: the caller supplies bytes and a multicodec tag directly.
//! Used for state-trie nodes, storage-trie nodes, and contract code — none
//! of which this crate has any structural opinion about.

use alloy_primitives::Bytes;
use indexer_primitives::keccak256;

use crate::{cid_and_key, multicodec, CodecError, EncodedNode};

pub fn encode(codec: u64, bytes: Bytes) -> Result<EncodedNode, CodecError> {
    let digest = keccak256(&bytes);
    let (cid, mh_key) = cid_and_key(codec, digest)?;
    Ok(EncodedNode { cid, mh_key, bytes })
}

pub fn encode_state_node(bytes: Bytes) -> Result<EncodedNode, CodecError> {
    encode(multicodec::ETH_STATE_TRIE, bytes)
}

pub fn encode_storage_node(bytes: Bytes) -> Result<EncodedNode, CodecError> {
    encode(multicodec::ETH_STORAGE_TRIE, bytes)
}

pub fn encode_code(bytes: Bytes) -> Result<EncodedNode, CodecError> {
    encode(multicodec::RAW, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishing_identical_bytes_twice_yields_the_same_key() {
        let bytes = Bytes::from_static(b"deadbeef");
        let first = encode_code(bytes.clone()).unwrap();
        let second = encode_code(bytes).unwrap();
        assert_eq!(first.mh_key, second.mh_key);
    }

    #[test]
    fn state_and_storage_nodes_get_distinct_codecs() {
        let bytes = Bytes::from_static(b"node");
        let state = encode_state_node(bytes.clone()).unwrap();
        let storage = encode_storage_node(bytes).unwrap();
        assert_ne!(state.cid, storage.cid);
    }
}
