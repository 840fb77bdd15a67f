//! Canonical block-layer IPLD nodes: header, uncle, transaction, receipt,
//! and the Merkle Patricia trie envelopes that commit them to a block's
//! `transactionsRoot`/`receiptsRoot`. Each is RLP-encoded the same way it
//! was decoded, then hashed and wrapped exactly like [`crate::raw`] does —
//! the only thing "structured" about these is which multicodec tag they
//! get and that the caller doesn't supply the bytes directly.

use alloy_primitives::Bytes;
use indexer_primitives::{keccak256, Header, Receipt, TransactionSigned};

use crate::{cid_and_key, multicodec, CodecError, EncodedNode};

fn encode_rlp(encodable: &impl alloy_rlp::Encodable) -> Bytes {
    let mut buf = Vec::new();
    encodable.encode(&mut buf);
    Bytes::from(buf)
}

pub fn encode_header(header: &Header) -> Result<EncodedNode, CodecError> {
    let bytes = encode_rlp(header);
    let digest = keccak256(&bytes);
    let (cid, mh_key) = cid_and_key(multicodec::ETH_BLOCK, digest)?;
    Ok(EncodedNode { cid, mh_key, bytes })
}

/// An uncle is itself a [`Header`]; it gets the same `eth-block` codec as
/// its canonical counterpart since the IPLD shape is identical.
pub fn encode_uncle(uncle: &Header) -> Result<EncodedNode, CodecError> {
    encode_header(uncle)
}

pub fn encode_transaction(tx: &TransactionSigned) -> Result<EncodedNode, CodecError> {
    let bytes = encode_rlp(tx);
    let digest = keccak256(&bytes);
    let (cid, mh_key) = cid_and_key(multicodec::ETH_TX, digest)?;
    Ok(EncodedNode { cid, mh_key, bytes })
}

pub fn encode_receipt(receipt: &Receipt) -> Result<EncodedNode, CodecError> {
    let bytes = encode_rlp(receipt);
    let digest = keccak256(&bytes);
    let (cid, mh_key) = cid_and_key(multicodec::ETH_TX_RECEIPT, digest)?;
    Ok(EncodedNode { cid, mh_key, bytes })
}

/// A node of the trie that commits to `transactionsRoot`, already RLP-encoded
/// by the upstream node (trie key path + value, or a branch/extension node).
pub fn encode_tx_trie_node(node_rlp: &Bytes) -> Result<EncodedNode, CodecError> {
    let digest = keccak256(node_rlp);
    let (cid, mh_key) = cid_and_key(multicodec::ETH_TX_TRIE, digest)?;
    Ok(EncodedNode { cid, mh_key, bytes: node_rlp.clone() })
}

/// A node of the trie that commits to `receiptsRoot`.
pub fn encode_receipt_trie_node(node_rlp: &Bytes) -> Result<EncodedNode, CodecError> {
    let digest = keccak256(node_rlp);
    let (cid, mh_key) = cid_and_key(multicodec::ETH_TX_RECEIPT_TRIE, digest)?;
    Ok(EncodedNode { cid, mh_key, bytes: node_rlp.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bloom, B256, B64, U256};
    use indexer_primitives::{
        transaction::{Transaction, TxKind, TxLegacy},
        PostTransactionState, Signature,
    };

    fn sample_header() -> Header {
        Header {
            parent_hash: B256::ZERO,
            ommers_hash: B256::ZERO,
            beneficiary: Address::ZERO,
            state_root: B256::ZERO,
            transactions_root: B256::ZERO,
            receipts_root: B256::ZERO,
            logs_bloom: Bloom::ZERO,
            difficulty: U256::ZERO,
            number: 1,
            gas_limit: 30_000_000,
            gas_used: 0,
            timestamp: 0,
            extra_data: Bytes::new(),
            mix_hash: B256::ZERO,
            nonce: B64::ZERO,
            base_fee_per_gas: None,
        }
    }

    #[test]
    fn header_encoding_is_deterministic_and_tagged_eth_block() {
        let header = sample_header();
        let encoded = encode_header(&header).unwrap();
        let encoded_again = encode_header(&header).unwrap();
        assert_eq!(encoded.cid, encoded_again.cid);
        assert_eq!(encoded.cid.codec(), multicodec::ETH_BLOCK);
    }

    #[test]
    fn transaction_encoding_is_tagged_eth_tx() {
        let tx = TransactionSigned {
            transaction: Transaction::Legacy(TxLegacy {
                chain_id: Some(1),
                nonce: 0,
                gas_price: 1,
                gas_limit: 21_000,
                to: TxKind::Call(Address::ZERO),
                value: U256::ZERO,
                input: Bytes::new(),
            }),
            signature: Signature { r: U256::from(1u8), s: U256::from(1u8), odd_y_parity: false },
            hash: B256::ZERO,
        };
        let encoded = encode_transaction(&tx).unwrap();
        assert_eq!(encoded.cid.codec(), multicodec::ETH_TX);
    }

    #[test]
    fn receipt_encoding_is_tagged_eth_tx_receipt() {
        let receipt = Receipt {
            post_state: PostTransactionState::Status(true),
            cumulative_gas_used: 21_000,
            bloom: Bloom::ZERO,
            logs: vec![],
        };
        let encoded = encode_receipt(&receipt).unwrap();
        assert_eq!(encoded.cid.codec(), multicodec::ETH_TX_RECEIPT);
    }
}
