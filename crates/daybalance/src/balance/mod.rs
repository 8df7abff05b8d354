//! Balance sources and the concurrent aggregator over them.

mod aggregate;
mod query;
mod source;

pub use aggregate::{aggregate_balances, aggregate_for_endpoint, AggregateResult};
pub use query::{
    parse_bank_balances, parse_commission, parse_delegations, parse_rewards, parse_unbonding,
    parse_vesting, BalanceError,
};
pub use source::BalanceSource;
