use alloy_primitives::U256;

/// The hard forks that change the static block reward. Ordered so that
/// `HardFork::at_block` can scan forward and return the last one activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HardFork {
    Frontier,
    Byzantium,
    Constantinople,
}

impl HardFork {
    /// Base block reward in wei before transaction fees and uncle bonuses,
    /// per the yellow paper (Frontier) and EIP-649/EIP-1234 (Byzantium,
    /// Constantinople).
    pub fn base_block_reward(&self) -> U256 {
        match self {
            HardFork::Frontier => U256::from(5_000_000_000_000_000_000u128),
            HardFork::Byzantium => U256::from(3_000_000_000_000_000_000u128),
            HardFork::Constantinople => U256::from(2_000_000_000_000_000_000u128),
        }
    }
}

/// Activation heights for Ethereum mainnet. This indexer only ever needs the
/// reward-affecting forks; it has no opinion on EIPs that don't change the
/// reward formula.
#[derive(Debug, Clone, Copy)]
pub struct ChainSpec {
    pub byzantium_block: u64,
    pub constantinople_block: u64,
}

impl ChainSpec {
    pub const MAINNET: ChainSpec =
        ChainSpec { byzantium_block: 4_370_000, constantinople_block: 7_280_000 };

    pub fn hard_fork_at(&self, block_number: u64) -> HardFork {
        if block_number >= self.constantinople_block {
            HardFork::Constantinople
        } else if block_number >= self.byzantium_block {
            HardFork::Byzantium
        } else {
            HardFork::Frontier
        }
    }

    /// The reward paid directly to an uncle's own miner for being included
    /// by `block_number` after being mined at `uncle_number`:
    /// `base_reward * (uncle_number + 8 - block_number) / 8`.
    pub fn uncle_reward(&self, block_number: u64, uncle_number: u64) -> U256 {
        let base = self.hard_fork_at(block_number).base_block_reward();
        let distance = (uncle_number + 8).saturating_sub(block_number);
        base * U256::from(distance) / U256::from(8u8)
    }

    /// The block miner's own bonus for including a single uncle: a flat
    /// `base_reward / 32`, independent of the uncle's distance. This is
    /// distinct from [`ChainSpec::uncle_reward`], which is paid to the
    /// uncle's own miner and does scale with distance.
    pub fn uncle_inclusion_reward(&self, block_number: u64) -> U256 {
        let base = self.hard_fork_at(block_number).base_block_reward();
        base / U256::from(32u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_byzantium_reward_is_three_ether() {
        let spec = ChainSpec::MAINNET;
        assert_eq!(spec.hard_fork_at(4_370_000), HardFork::Byzantium);
        assert_eq!(
            spec.hard_fork_at(4_370_000).base_block_reward(),
            U256::from(3_000_000_000_000_000_000u128)
        );
    }

    #[test]
    fn mainnet_pre_byzantium_reward_is_five_ether() {
        let spec = ChainSpec::MAINNET;
        assert_eq!(spec.hard_fork_at(1), HardFork::Frontier);
    }

    #[test]
    fn uncle_reward_scales_with_distance() {
        let spec = ChainSpec::MAINNET;
        // Uncle one block behind the canonical block: (n - 1 + 8 - n) / 8 * base = 7/8 base.
        let reward = spec.uncle_reward(4_370_010, 4_370_009);
        assert_eq!(reward, U256::from(3_000_000_000_000_000_000u128) * U256::from(7u8) / U256::from(8u8));
    }

    #[test]
    fn uncle_inclusion_reward_is_flat_regardless_of_distance() {
        let spec = ChainSpec::MAINNET;
        let base = HardFork::Byzantium.base_block_reward();
        assert_eq!(spec.uncle_inclusion_reward(4_370_010), base / U256::from(32u8));
        assert_eq!(
            spec.uncle_inclusion_reward(4_370_010),
            spec.uncle_inclusion_reward(4_370_100)
        );
    }
}
