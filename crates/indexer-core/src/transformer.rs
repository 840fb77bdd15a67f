//! The Block Transformer: decodes one differential payload, content-addresses
//! every entity it carries, computes the block reward, and writes the whole
//! result through the Persistence Gateway inside a single transaction.

use std::{collections::BTreeSet, str::FromStr, time::Instant};

use alloy_primitives::{Address, Bytes, B256};
use alloy_rlp::{Decodable, Encodable};
use bigdecimal::BigDecimal;

use indexer_codec::{raw, structured};
use indexer_db::{
    rows::{HeaderRow, ReceiptRow, StateAccountRow, StateNodeRow, StorageNodeRow, TransactionRow, UncleRow},
    Gateway,
};
use indexer_metrics::{Metrics, Stage};
use indexer_primitives::{state::NodeType, Account, Block, ChainSpec, DiffPayload, Receipt};

use crate::{error::TransformError, reward::block_reward, trie};

/// Runs the full twelve-step indexing algorithm over one payload and
/// returns the indexed block's height. `worker_id` is carried only for
/// logging.
pub async fn transform(
    worker_id: usize,
    payload: DiffPayload,
    gateway: &Gateway,
    metrics: &Metrics,
    chain_spec: &ChainSpec,
) -> Result<u64, TransformError> {
    let decode_started = Instant::now();
    let block = Block::decode(&mut payload.block_rlp.as_ref()).map_err(TransformError::DecodeBlock)?;
    let receipts = Vec::<Receipt>::decode(&mut payload.receipts_rlp.as_ref())
        .map_err(TransformError::DecodeReceipts)?;
    let state_object = indexer_primitives::StateObject::decode(&mut payload.state_object_rlp.as_ref())
        .map_err(TransformError::DecodeStateObject)?;
    metrics.record_stage(Stage::PayloadDecode, decode_started.elapsed());

    if block.transactions.len() != receipts.len() {
        return Err(TransformError::TransactionReceiptCountMismatch {
            txs: block.transactions.len(),
            receipts: receipts.len(),
        });
    }

    let header_node = structured::encode_header(&block.header)?;
    let uncle_nodes =
        block.ommers.iter().map(structured::encode_uncle).collect::<Result<Vec<_>, _>>()?;
    let tx_nodes =
        block.transactions.iter().map(structured::encode_transaction).collect::<Result<Vec<_>, _>>()?;
    let receipt_nodes =
        receipts.iter().map(structured::encode_receipt).collect::<Result<Vec<_>, _>>()?;

    let tx_bytes: Vec<Bytes> = tx_nodes.iter().map(|node| node.bytes.clone()).collect();
    let receipt_bytes: Vec<Bytes> = receipt_nodes.iter().map(|node| node.bytes.clone()).collect();
    let tx_trie_nodes = trie::ordered_trie_nodes(&tx_bytes)
        .iter()
        .map(structured::encode_tx_trie_node)
        .collect::<Result<Vec<_>, _>>()?;
    let receipt_trie_nodes = trie::ordered_trie_nodes(&receipt_bytes)
        .iter()
        .map(structured::encode_receipt_trie_node)
        .collect::<Result<Vec<_>, _>>()?;

    if tx_nodes.len() != tx_trie_nodes.len() || receipt_nodes.len() != receipt_trie_nodes.len() {
        return Err(TransformError::TrieNodeCountMismatch {
            tx_nodes: tx_nodes.len(),
            tx_trie_nodes: tx_trie_nodes.len(),
            receipt_nodes: receipt_nodes.len(),
            receipt_trie_nodes: receipt_trie_nodes.len(),
        });
    }

    let reward = block_reward(chain_spec, &block.header, &block.ommers, &block.transactions, &receipts);

    let free_postgres_started = Instant::now();
    let mut tx = gateway.begin().await?;
    metrics.record_stage(Stage::FreePostgres, free_postgres_started.elapsed());

    let header_started = Instant::now();
    gateway.publish_bytes(&mut tx, &header_node.mh_key, &header_node.bytes).await?;
    let header_row = HeaderRow {
        block_number: block.header.number as i64,
        block_hash: format!("{:#x}", block.hash()),
        parent_hash: format!("{:#x}", block.header.parent_hash),
        cid: header_node.cid.to_string(),
        mh_key: header_node.mh_key.clone(),
        total_difficulty: u256_to_bigdecimal(payload.total_difficulty),
        reward: u256_to_bigdecimal(reward),
        state_root: format!("{:#x}", block.header.state_root),
        tx_root: format!("{:#x}", block.header.transactions_root),
        receipt_root: format!("{:#x}", block.header.receipts_root),
        uncle_root: format!("{:#x}", block.header.ommers_hash),
        bloom: block.header.logs_bloom.as_slice().to_vec(),
        timestamp: BigDecimal::from(block.header.timestamp),
    };
    let header_id = gateway.upsert_header(&mut tx, &header_row).await?;
    metrics.record_stage(Stage::HeaderProcessing, header_started.elapsed());

    let uncle_started = Instant::now();
    for (uncle, node) in block.ommers.iter().zip(&uncle_nodes) {
        gateway.publish_bytes(&mut tx, &node.mh_key, &node.bytes).await?;
        let uncle_reward = chain_spec.uncle_reward(block.header.number, uncle.number);
        let uncle_row = UncleRow {
            block_hash: format!("{:#x}", uncle.hash_slow()),
            parent_hash: format!("{:#x}", uncle.parent_hash),
            cid: node.cid.to_string(),
            mh_key: node.mh_key.clone(),
            reward: u256_to_bigdecimal(uncle_reward),
        };
        gateway.upsert_uncle(&mut tx, &uncle_row, header_id).await?;
    }
    metrics.record_stage(Stage::UncleProcessing, uncle_started.elapsed());

    let tx_receipt_started = Instant::now();
    for i in 0..block.transactions.len() {
        gateway.publish_bytes(&mut tx, &tx_trie_nodes[i].mh_key, &tx_trie_nodes[i].bytes).await?;
        gateway
            .publish_bytes(&mut tx, &receipt_trie_nodes[i].mh_key, &receipt_trie_nodes[i].bytes)
            .await?;
        gateway.publish_bytes(&mut tx, &tx_nodes[i].mh_key, &tx_nodes[i].bytes).await?;
        gateway.publish_bytes(&mut tx, &receipt_nodes[i].mh_key, &receipt_nodes[i].bytes).await?;

        let signed = &block.transactions[i];
        let sender = signed.recover_signer()?;

        let tx_row = TransactionRow {
            tx_hash: format!("{:#x}", signed.hash),
            index: i as i64,
            src: normalize_address(sender),
            dst: signed.transaction.to().to().map(normalize_address).unwrap_or_default(),
            cid: tx_nodes[i].cid.to_string(),
            mh_key: tx_nodes[i].mh_key.clone(),
            data: tx_nodes[i].bytes.to_vec(),
        };
        let tx_id = gateway.upsert_transaction(&mut tx, &tx_row, header_id).await?;

        let receipt = &receipts[i];
        let receipt_row = build_receipt_row(receipt, &receipt_nodes[i], signed, sender);
        gateway.upsert_receipt(&mut tx, &receipt_row, tx_id).await?;
    }
    metrics.record_stage(Stage::TxReceiptProcessing, tx_receipt_started.elapsed());

    let state_store_started = Instant::now();
    for state_diff in &state_object.nodes {
        let encoded = raw::encode_state_node(state_diff.node_rlp.clone())?;
        gateway.publish_bytes(&mut tx, &encoded.mh_key, &encoded.bytes).await?;

        let state_node = state_diff.into_state_node();
        let state_row = StateNodeRow {
            state_path: state_diff.path.to_vec(),
            cid: encoded.cid.to_string(),
            mh_key: encoded.mh_key.clone(),
            state_leaf_key: state_node.leaf_key.map(normalize_hash).unwrap_or_default(),
            node_type: state_diff.node_type as i32,
            diff: true,
        };
        let state_id = gateway.upsert_state_node(&mut tx, &state_row, header_id).await?;

        if state_node.node_type == NodeType::Leaf {
            let account = decode_leaf_account(&state_diff.node_rlp)?;
            let account_row = StateAccountRow {
                balance: u256_to_bigdecimal(account.balance),
                nonce: account.nonce as i64,
                code_hash: format!("{:#x}", account.code_hash),
                storage_root: format!("{:#x}", account.storage_root),
            };
            gateway.upsert_state_account(&mut tx, &account_row, state_id).await?;
        }

        for storage_node in state_diff.storage_nodes() {
            let encoded = raw::encode_storage_node(storage_node.node_rlp.clone())?;
            gateway.publish_bytes(&mut tx, &encoded.mh_key, &encoded.bytes).await?;
            let storage_row = StorageNodeRow {
                storage_path: storage_node.path.to_vec(),
                cid: encoded.cid.to_string(),
                mh_key: encoded.mh_key,
                storage_leaf_key: storage_node.leaf_key.map(normalize_hash).unwrap_or_default(),
                node_type: storage_node.node_type as i32,
                diff: true,
            };
            gateway.upsert_storage_node(&mut tx, &storage_row, state_id).await?;
        }
    }

    for code_and_hash in &state_object.code_and_code_hashes {
        let encoded = raw::encode_code(code_and_hash.code.clone())?;
        gateway.publish_bytes(&mut tx, &encoded.mh_key, &encoded.bytes).await?;
    }
    metrics.record_stage(Stage::StateStoreProcessing, state_store_started.elapsed());

    let commit_started = Instant::now();
    gateway.commit(tx).await?;
    metrics.record_stage(Stage::PostgresCommit, commit_started.elapsed());

    tracing::info!(worker_id, height = block.header.number, "indexed block");
    Ok(block.header.number)
}

fn build_receipt_row(
    receipt: &Receipt,
    node: &indexer_codec::EncodedNode,
    signed: &indexer_primitives::TransactionSigned,
    sender: Address,
) -> ReceiptRow {
    let mut topic0s = Vec::new();
    let mut topic1s = Vec::new();
    let mut topic2s = Vec::new();
    let mut topic3s = Vec::new();
    let mut log_contracts = BTreeSet::new();

    for log in &receipt.logs {
        log_contracts.insert(normalize_address(log.address));
        let columns = [&mut topic0s, &mut topic1s, &mut topic2s, &mut topic3s];
        for (position, column) in columns.into_iter().enumerate() {
            if let Some(topic) = log.topics.get(position) {
                column.push(normalize_hash(*topic));
            }
        }
    }

    let contract = match signed.transaction.to().to() {
        Some(_) => String::new(),
        None => normalize_address(contract_address(sender, signed.transaction.nonce())),
    };
    let contract_hash = if contract.is_empty() {
        String::new()
    } else {
        format!("{:#x}", indexer_primitives::keccak256(contract.as_bytes()))
    };

    let (post_state, post_status) = match receipt.post_state {
        indexer_primitives::PostTransactionState::State(root) => (Some(format!("{root:#x}")), None),
        indexer_primitives::PostTransactionState::Status(success) => (None, Some(success as i32)),
    };

    ReceiptRow {
        cid: node.cid.to_string(),
        mh_key: node.mh_key.clone(),
        contract,
        contract_hash,
        topic0s,
        topic1s,
        topic2s,
        topic3s,
        log_contracts: log_contracts.into_iter().collect(),
        post_state,
        post_status,
    }
}

/// `CREATE` contract address: the low 20 bytes of `Keccak256(rlp([sender, nonce]))`.
fn contract_address(sender: Address, nonce: u64) -> Address {
    #[derive(alloy_rlp::RlpEncodable)]
    struct CreateAddressInput {
        sender: Address,
        nonce: u64,
    }
    let mut buf = Vec::new();
    CreateAddressInput { sender, nonce }.encode(&mut buf);
    let hash = indexer_primitives::keccak256(buf);
    Address::from_slice(&hash[12..])
}

/// A state leaf's RLP is a two-element list `[encodedPath, value]`; `value`
/// is itself the RLP-encoded account.
fn decode_leaf_account(node_rlp: &Bytes) -> Result<Account, TransformError> {
    let mut buf: &[u8] = node_rlp.as_ref();
    let header = alloy_rlp::Header::decode(&mut buf).map_err(TransformError::InvalidAccountLeaf)?;
    if !header.list {
        return Err(TransformError::InvalidAccountLeaf(alloy_rlp::Error::UnexpectedString));
    }
    let _path = alloy_rlp::Bytes::decode(&mut buf).map_err(TransformError::InvalidAccountLeaf)?;
    Account::decode(&mut buf).map_err(TransformError::InvalidAccountLeaf)
}

fn normalize_address(address: Address) -> String {
    if address.is_zero() {
        String::new()
    } else {
        format!("{address:#x}")
    }
}

fn normalize_hash(hash: B256) -> String {
    if hash.is_zero() {
        String::new()
    } else {
        format!("{hash:#x}")
    }
}

fn u256_to_bigdecimal(value: alloy_primitives::U256) -> BigDecimal {
    BigDecimal::from_str(&value.to_string()).expect("a U256's decimal string is always a valid BigDecimal")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    #[test]
    fn contract_address_is_deterministic() {
        let sender = Address::repeat_byte(0xab);
        assert_eq!(contract_address(sender, 0), contract_address(sender, 0));
        assert_ne!(contract_address(sender, 0), contract_address(sender, 1));
    }

    #[test]
    fn zero_address_normalizes_to_empty_string() {
        assert_eq!(normalize_address(Address::ZERO), "");
        assert_eq!(normalize_address(Address::repeat_byte(0x1)), format!("{:#x}", Address::repeat_byte(0x1)));
    }

    #[test]
    fn zero_hash_normalizes_to_empty_string() {
        assert_eq!(normalize_hash(B256::ZERO), "");
    }

    #[test]
    fn u256_round_trips_through_bigdecimal_string() {
        let value = U256::from(123_456_789u64);
        let decimal = u256_to_bigdecimal(value);
        assert_eq!(decimal, BigDecimal::from(123_456_789u64));
    }
}
