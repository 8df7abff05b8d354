//! Request orchestration: from (chain, address, optional date range) to
//! per-source coin maps.

use crate::balance::{aggregate_for_endpoint, AggregateResult};
use crate::chain::{BlockMeta, ChainError, Endpoints};
use crate::config::{Config, ConfigError};
use crate::height::{estimate_height, resolve_daily_heights, BlockRef, EstimateError, ResolveError};
use std::collections::BTreeMap;
use thiserror::Error;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::info;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("chain: {0}")]
    Chain(#[from] ChainError),
    #[error("estimate: {0}")]
    Estimate(#[from] EstimateError),
    #[error("resolve: {0}")]
    Resolve(#[from] ResolveError),
    #[error("invalid date {raw:?}: expected YYYY-MM-DD")]
    BadDate { raw: String },
}

/// Parse a calendar-day parameter (`YYYY-MM-DD`).
pub fn parse_day(raw: &str) -> Result<Date, ServiceError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        ServiceError::BadDate {
            raw: raw.to_string(),
        }
    })
}

/// The service facade the inbound surface drives. Holds the read-only
/// endpoint table; every call is otherwise request-scoped.
pub struct App {
    endpoints: Endpoints,
}

impl App {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoints: config.endpoints()?,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Aggregate every registered source at the current head.
    pub async fn balances_at_head(
        &self,
        chain: &str,
        address: &str,
    ) -> Result<AggregateResult, ServiceError> {
        let endpoint = self.endpoints.get(chain)?;
        Ok(aggregate_for_endpoint(endpoint, address, 0).await)
    }

    /// Resolve one height per day across the inclusive range, keyed by day.
    ///
    /// The initial block interval comes from the head and its predecessor;
    /// the range's end day is estimated from the head sample, and the
    /// day-by-day walk then runs backward from there.
    pub async fn daily_heights(
        &self,
        chain: &str,
        started_at: Date,
        ended_at: Date,
    ) -> Result<BTreeMap<Date, i64>, ServiceError> {
        let endpoint = self.endpoints.get(chain)?;

        let head = endpoint.latest_height().await?;
        let head_time = endpoint.block_time(head).await?;
        let prev_time = endpoint.block_time(head - 1).await?;
        let interval = head_time - prev_time;

        let end_target = day_start(ended_at);
        let end = estimate_height(
            endpoint,
            end_target,
            BlockRef {
                height: head,
                time: head_time,
            },
            interval,
        )
        .await?;
        info!(chain, height = end.height, %end_target, "resolved range end");

        let days = resolve_daily_heights(
            endpoint,
            started_at,
            ended_at,
            interval,
            BlockRef {
                height: end.height,
                time: end_target,
            },
        )
        .await?;
        Ok(days)
    }

    /// Aggregate every registered source at one resolved height per day.
    pub async fn balances_for_range(
        &self,
        chain: &str,
        address: &str,
        started_at: Date,
        ended_at: Date,
    ) -> Result<BTreeMap<Date, AggregateResult>, ServiceError> {
        let days = self.daily_heights(chain, started_at, ended_at).await?;
        let endpoint = self.endpoints.get(chain)?;

        let mut out = BTreeMap::new();
        for (day, height) in days {
            let balances = aggregate_for_endpoint(endpoint, address, height).await;
            out.insert(day, balances);
        }
        Ok(out)
    }
}

/// Midnight UTC of `day`, the timestamp daily resolution targets.
pub fn day_start(day: Date) -> OffsetDateTime {
    day.midnight().assume_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parse_day_accepts_date_only() {
        assert_eq!(parse_day("2024-01-09").unwrap(), date!(2024 - 01 - 09));
        assert_eq!(parse_day(" 2024-12-31 ").unwrap(), date!(2024 - 12 - 31));
    }

    #[test]
    fn parse_day_rejects_times_and_garbage() {
        assert!(parse_day("2024-01-09T10:00:00Z").is_err());
        assert!(parse_day("01-09-2024").is_err());
        assert!(parse_day("yesterday").is_err());
        assert!(parse_day("2024-13-01").is_err());
    }

    #[test]
    fn day_start_is_utc_midnight() {
        let t = day_start(date!(2024 - 01 - 09));
        assert_eq!(t.date(), date!(2024 - 01 - 09));
        assert_eq!(t.time(), time::Time::MIDNIGHT);
        assert!(t.offset().is_utc());
    }
}
