//! Day-by-day height resolution across a calendar range.

use crate::chain::BlockMeta;
use crate::height::estimate::{estimate_height, BlockRef, EstimateError};
use std::collections::BTreeMap;
use thiserror::Error;
use time::{Date, Duration};
use tracing::{debug, warn};

/// Consecutive failed lookups on one day before the whole resolution aborts.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 10;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("block interval must be positive, got {0}")]
    NonPositiveInterval(Duration),
    #[error("{failures} consecutive block time lookups failed at {day}, giving up: {source}")]
    TooManyFailures {
        day: Date,
        failures: u32,
        source: EstimateError,
    },
}

/// Mapping from calendar day (UTC midnight) to the resolved height.
pub type DailyHeights = BTreeMap<Date, i64>;

/// Resolve one height per day over the inclusive `[started_at, ended_at]`
/// range, walking backward from the range's end.
///
/// `end_reference` is the (height, midnight) sample for `ended_at`. The block
/// interval corrected on each day carries into the next, so later days keep
/// refining the rate instead of restarting from the initial guess. A failed
/// lookup stalls the cursor and retries the same day; after
/// [`MAX_CONSECUTIVE_FAILURES`] consecutive failures the resolution aborts
/// and every day resolved so far is discarded. A sparse map would read as
/// authoritative when it is not.
pub async fn resolve_daily_heights<M: BlockMeta + ?Sized>(
    meta: &M,
    started_at: Date,
    ended_at: Date,
    interval: Duration,
    end_reference: BlockRef,
) -> Result<DailyHeights, ResolveError> {
    if !interval.is_positive() {
        return Err(ResolveError::NonPositiveInterval(interval));
    }

    let mut heights = DailyHeights::new();
    let mut interval = interval;
    let mut failures: u32 = 0;
    let mut day = ended_at;

    while day >= started_at {
        let target = day.midnight().assume_utc();
        match estimate_height(meta, target, end_reference, interval).await {
            Ok(est) => {
                failures = 0;
                interval = est.interval;
                heights.insert(day, est.height);
                debug!(%day, height = est.height, %interval, "resolved day");
                match day.previous_day() {
                    Some(prev) => day = prev,
                    None => break,
                }
            }
            Err(source) => {
                failures += 1;
                warn!(%day, failures, "block time lookup failed: {source}");
                if failures > MAX_CONSECUTIVE_FAILURES {
                    return Err(ResolveError::TooManyFailures {
                        day,
                        failures,
                        source,
                    });
                }
                // The cursor does not advance; the same day is retried.
            }
        }
    }

    Ok(heights)
}
