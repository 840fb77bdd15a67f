use alloy_primitives::U256;
use indexer_primitives::{ChainSpec, Header, Receipt, TransactionSigned};

/// `reward = static_block_reward(height) + sum(tx.gasUsed * tx.gasPrice) +
/// num_uncles * (base/32)`, per §4.3 step 5. The per-uncle term is the flat
/// nephew bonus paid to the block's own miner, not the uncle miner's own
/// distance-scaled reward (that one is computed separately per uncle row,
/// via `ChainSpec::uncle_reward`, at the point each uncle is upserted).
pub fn block_reward(
    chain_spec: &ChainSpec,
    header: &Header,
    uncles: &[Header],
    txs: &[TransactionSigned],
    receipts: &[Receipt],
) -> U256 {
    let base = chain_spec.hard_fork_at(header.number).base_block_reward();
    let tx_fees = transaction_fees(header, txs, receipts);
    let uncle_bonus = U256::from(uncles.len() as u64) * chain_spec.uncle_inclusion_reward(header.number);

    base + tx_fees + uncle_bonus
}

/// Per-tx gas used is the delta between consecutive cumulative gas used
/// values (the first transaction's gas used equals its own cumulative
/// total).
fn transaction_fees(header: &Header, txs: &[TransactionSigned], receipts: &[Receipt]) -> U256 {
    let mut total = U256::ZERO;
    let mut previous_cumulative = 0u64;
    for (tx, receipt) in txs.iter().zip(receipts) {
        let gas_used = receipt.cumulative_gas_used.saturating_sub(previous_cumulative);
        previous_cumulative = receipt.cumulative_gas_used;
        let gas_price = tx.transaction.effective_gas_price(header.base_fee_per_gas.map(u128::from));
        total += U256::from(gas_used) * U256::from(gas_price);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bloom, Bytes, B256, B64};
    use indexer_primitives::{
        transaction::{Transaction, TxKind, TxLegacy},
        PostTransactionState, Signature,
    };

    fn header_at(number: u64) -> Header {
        Header {
            parent_hash: B256::ZERO,
            ommers_hash: B256::ZERO,
            beneficiary: Address::ZERO,
            state_root: B256::ZERO,
            transactions_root: B256::ZERO,
            receipts_root: B256::ZERO,
            logs_bloom: Bloom::ZERO,
            difficulty: U256::ZERO,
            number,
            gas_limit: 30_000_000,
            gas_used: 21_000,
            timestamp: 0,
            extra_data: Bytes::new(),
            mix_hash: B256::ZERO,
            nonce: B64::ZERO,
            base_fee_per_gas: None,
        }
    }

    #[test]
    fn byzantium_boundary_switches_base_reward() {
        let chain_spec = ChainSpec::MAINNET;
        let reward = block_reward(&chain_spec, &header_at(4_370_000), &[], &[], &[]);
        assert_eq!(reward, U256::from(3_000_000_000_000_000_000u128));
        let reward = block_reward(&chain_spec, &header_at(4_369_999), &[], &[], &[]);
        assert_eq!(reward, U256::from(5_000_000_000_000_000_000u128));
    }

    #[test]
    fn two_uncles_contribute_two_base_thirty_seconds() {
        let chain_spec = ChainSpec::MAINNET;
        let header = header_at(4_370_010);
        let uncles = [header_at(4_370_009), header_at(4_370_008)];
        let reward = block_reward(&chain_spec, &header, &uncles, &[], &[]);
        let base = chain_spec.hard_fork_at(header.number).base_block_reward();
        assert_eq!(reward, base + U256::from(2u8) * (base / U256::from(32u8)));
    }

    #[test]
    fn tx_fees_use_cumulative_gas_deltas() {
        let chain_spec = ChainSpec::MAINNET;
        let header = header_at(1);
        let tx = TransactionSigned {
            transaction: Transaction::Legacy(TxLegacy {
                chain_id: Some(1),
                nonce: 0,
                gas_price: 10,
                gas_limit: 21_000,
                to: TxKind::Call(Address::ZERO),
                value: U256::ZERO,
                input: Bytes::new(),
            }),
            signature: Signature { r: U256::from(1u8), s: U256::from(1u8), odd_y_parity: false },
            hash: B256::ZERO,
        };
        let receipt = Receipt {
            post_state: PostTransactionState::Status(true),
            cumulative_gas_used: 21_000,
            bloom: Bloom::ZERO,
            logs: vec![],
        };
        let reward = block_reward(&chain_spec, &header, &[], &[tx], &[receipt]);
        let expected_fee = U256::from(21_000u64) * U256::from(10u64);
        assert_eq!(reward, chain_spec.hard_fork_at(1).base_block_reward() + expected_fee);
    }
}
