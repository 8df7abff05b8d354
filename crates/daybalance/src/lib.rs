//! daybalance — historical per-day balance queries for Cosmos-style chains.
//!
//! A node only answers "what is the timestamp of height H" and "what is the
//! head right now", so calendar dates are resolved to heights with a
//! self-correcting block-interval estimate. Resolved heights then fan out
//! concurrently to the bank, staking, and distribution balance sources.
//! Read-only; no keys, no signing, no caching.

pub mod balance;
pub mod chain;
pub mod coin;
pub mod config;
pub mod height;
pub mod service;

pub use balance::{
    aggregate_balances, aggregate_for_endpoint, AggregateResult, BalanceError, BalanceSource,
};
pub use chain::{BlockMeta, ChainEndpoint, ChainError, Endpoints, RpcClient, TransportError};
pub use coin::{Coin, Coins};
pub use config::{ChainConfig, Config, ConfigError};
pub use height::{
    estimate_height, resolve_daily_heights, BlockRef, DailyHeights, EstimateError, HeightEstimate,
    ResolveError,
};
pub use service::{parse_day, App, ServiceError};
