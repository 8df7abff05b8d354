//! The fixed set of balance sources an address can hold value in.

use serde::{Deserialize, Serialize};

/// One independently queryable category of an address's holdings.
///
/// The order here is the iteration order everywhere results are keyed by
/// source. Commission and vesting are defined for callers that want them but
/// are not part of the default registry.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BalanceSource {
    BankBalance,
    StakingDelegation,
    StakingUnbonding,
    DistributionReward,
    DistributionCommission,
    AuthVesting,
}

impl BalanceSource {
    /// The default registry: every source queried by an aggregate call.
    pub const REGISTERED: [BalanceSource; 4] = [
        BalanceSource::BankBalance,
        BalanceSource::StakingDelegation,
        BalanceSource::StakingUnbonding,
        BalanceSource::DistributionReward,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            BalanceSource::BankBalance => "bank_balance",
            BalanceSource::StakingDelegation => "staking_delegation",
            BalanceSource::StakingUnbonding => "staking_unbonding",
            BalanceSource::DistributionReward => "distribution_reward",
            BalanceSource::DistributionCommission => "distribution_commission",
            BalanceSource::AuthVesting => "auth_vesting",
        }
    }
}

impl std::fmt::Display for BalanceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_sorted_and_distinct() {
        let mut sorted = BalanceSource::REGISTERED;
        sorted.sort();
        assert_eq!(sorted, BalanceSource::REGISTERED);
        assert!(!BalanceSource::REGISTERED.contains(&BalanceSource::DistributionCommission));
        assert!(!BalanceSource::REGISTERED.contains(&BalanceSource::AuthVesting));
    }

    #[test]
    fn tag_matches_serde_name() {
        let json = serde_json::to_string(&BalanceSource::BankBalance).unwrap();
        assert_eq!(json, "\"bank_balance\"");
        assert_eq!(BalanceSource::StakingUnbonding.to_string(), "staking_unbonding");
    }
}
