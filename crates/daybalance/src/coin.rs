//! Coin amounts as reported by the chain's balance sources.

use serde::{Deserialize, Serialize};

/// One denomination's amount. Amounts are non-negative; on-chain decimal
/// amounts (distribution rewards) truncate at the decimal point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl std::fmt::Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A list of coins from one source. Different sources are never merged.
pub type Coins = Vec<Coin>;
