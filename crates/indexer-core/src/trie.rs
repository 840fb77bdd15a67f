//! Merkle Patricia Trie node extraction for the transactions and receipts
//! tries. Built the same way any ordered trie is built in this corpus: an
//! `alloy_trie::HashBuilder` fed leaves in ascending key order, with a
//! proof retainer targeting every key so every node that gets its own hash
//! (as opposed to being embedded inline in its parent) is captured.

use alloy_primitives::Bytes;
use alloy_rlp::Encodable;
use alloy_trie::{proof::ProofRetainer, HashBuilder, Nibbles};

/// The trie nodes that commit `values` (already RLP-encoded transactions or
/// receipts) under keys `rlp(0), rlp(1), ..., rlp(values.len() - 1)` — the
/// same keying scheme `transactionsRoot`/`receiptsRoot` use. Nodes small
/// enough to be embedded inline in their parent never get their own hash
/// and so never appear in the result, matching what the upstream node
/// actually publishes.
pub fn ordered_trie_nodes(values: &[Bytes]) -> Vec<Bytes> {
    let mut entries: Vec<(Nibbles, &Bytes)> = values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let mut key_rlp = Vec::new();
            (index as u64).encode(&mut key_rlp);
            (Nibbles::unpack(key_rlp), value)
        })
        .collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    let targets = entries.iter().map(|(key, _)| key.clone()).collect();
    let mut hash_builder = HashBuilder::default().with_proof_retainer(ProofRetainer::new(targets));
    for (key, value) in &entries {
        hash_builder.add_leaf(key.clone(), value.as_ref());
    }
    hash_builder.root();

    hash_builder.take_proof_nodes().into_nodes_sorted().into_iter().map(|(_, node)| node).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_trie_has_exactly_one_node() {
        let values = vec![Bytes::from_static(b"first-transaction-rlp")];
        let nodes = ordered_trie_nodes(&values);
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn node_set_is_deterministic() {
        let values = vec![
            Bytes::from_static(b"tx-zero"),
            Bytes::from_static(b"tx-one"),
            Bytes::from_static(b"tx-two"),
        ];
        assert_eq!(ordered_trie_nodes(&values), ordered_trie_nodes(&values));
    }
}
