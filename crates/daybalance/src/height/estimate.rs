//! One-shot block height estimation for a target wall-clock time.
//!
//! Block production rate drifts with validator-set and network changes, so a
//! static interval assumption goes wrong over long spans. The estimator
//! probes once with the assumed interval, verifies the probe's timestamp,
//! and applies at most one interval correction. Cost is bounded at one
//! `block_time` round trip per call.

use crate::chain::{BlockMeta, ChainError};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;

/// Block timestamps are irregular; anything within this band of the target
/// counts as a hit.
pub const CLOCK_TOLERANCE: Duration = Duration::seconds(10);

#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("chain: {0}")]
    Chain(#[from] ChainError),
    #[error("block interval must be positive, got {0}")]
    NonPositiveInterval(Duration),
    #[error("target time {target} is after the reference time {reference}")]
    TargetAfterReference {
        target: OffsetDateTime,
        reference: OffsetDateTime,
    },
}

/// A known (height, timestamp) sample, usually taken at the chain head.
#[derive(Clone, Copy, Debug)]
pub struct BlockRef {
    pub height: i64,
    pub time: OffsetDateTime,
}

/// Working state of the estimation: the resolved height and the interval
/// after any correction, which callers carry forward into later estimates.
/// The interval is strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeightEstimate {
    pub height: i64,
    pub interval: Duration,
}

fn blocks_passed(elapsed: Duration, interval: Duration) -> i64 {
    (elapsed.whole_nanoseconds() / interval.whole_nanoseconds()) as i64
}

fn per_block(total: Duration, blocks: i64) -> Duration {
    Duration::nanoseconds((total.whole_nanoseconds() / i128::from(blocks)) as i64)
}

/// Estimate the height whose timestamp is closest to `target`, given a
/// reference sample and an assumed block interval.
///
/// One probe query verifies the guess; if the probe's timestamp misses the
/// target by more than [`CLOCK_TOLERANCE`], the interval is corrected once
/// from the observed error and the height recomputed. This is a single
/// correction pass, not a loop to convergence.
pub async fn estimate_height<M: BlockMeta + ?Sized>(
    meta: &M,
    target: OffsetDateTime,
    reference: BlockRef,
    interval: Duration,
) -> Result<HeightEstimate, EstimateError> {
    if !interval.is_positive() {
        return Err(EstimateError::NonPositiveInterval(interval));
    }
    if target > reference.time {
        return Err(EstimateError::TargetAfterReference {
            target,
            reference: reference.time,
        });
    }

    let elapsed = reference.time - target;
    let mut passed = blocks_passed(elapsed, interval);
    let mut height = reference.height - passed;

    let observed = meta.block_time(height).await?;
    let diff = observed - target;
    // A target right at the reference legitimately makes `passed` zero, and
    // the correction would divide by it.
    if diff.abs() <= CLOCK_TOLERANCE || passed == 0 {
        return Ok(HeightEstimate { height, interval });
    }

    let adjustment = per_block(diff.abs(), passed);
    let corrected = if diff.is_positive() {
        interval - adjustment
    } else {
        interval + adjustment
    };
    if !corrected.is_positive() {
        // The observed error implies a nonsensical rate; the probe height is
        // the best answer available without another round trip.
        return Ok(HeightEstimate { height, interval });
    }

    passed = blocks_passed(elapsed, corrected);
    height = reference.height - passed;
    debug!(%diff, %corrected, height, "corrected block interval");
    Ok(HeightEstimate {
        height,
        interval: corrected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::height::testutil::FakeChain;
    use time::macros::datetime;

    #[test]
    fn blocks_passed_floors() {
        assert_eq!(
            blocks_passed(Duration::seconds(60), Duration::milliseconds(4800)),
            12
        );
        assert_eq!(blocks_passed(Duration::seconds(59), Duration::seconds(6)), 9);
    }

    #[tokio::test]
    async fn accepts_probe_within_tolerance() {
        let head = datetime!(2024-01-10 0:00 UTC);
        let chain = FakeChain::regular(1000, head, Duration::seconds(6));
        let target = datetime!(2024-01-09 23:59:00 UTC);
        let est = estimate_height(
            &chain,
            target,
            BlockRef {
                height: 1000,
                time: head,
            },
            Duration::seconds(6),
        )
        .await
        .unwrap();
        assert_eq!(est.height, 990);
        assert_eq!(est.interval, Duration::seconds(6));
    }

    #[tokio::test]
    async fn corrects_interval_once_from_observed_error() {
        // Head 1000 at midnight, initial interval 6s. The probe at 990 reads
        // 12s late, so the interval shrinks to 4.8s and the recomputed height
        // is 988.
        let head = datetime!(2024-01-10 0:00 UTC);
        let target = datetime!(2024-01-09 23:59:00 UTC);
        let mut chain = FakeChain::regular(1000, head, Duration::seconds(6));
        chain.set_time(990, target + Duration::seconds(12));
        let est = estimate_height(
            &chain,
            target,
            BlockRef {
                height: 1000,
                time: head,
            },
            Duration::seconds(6),
        )
        .await
        .unwrap();
        assert_eq!(est.height, 988);
        assert_eq!(est.interval, Duration::milliseconds(4800));
    }

    #[tokio::test]
    async fn grows_interval_when_probe_is_early() {
        let head = datetime!(2024-01-10 0:00 UTC);
        let target = datetime!(2024-01-09 23:59:00 UTC);
        let mut chain = FakeChain::regular(1000, head, Duration::seconds(6));
        // Probe reads 30s before the target: blocks are slower than assumed.
        chain.set_time(990, target - Duration::seconds(30));
        let est = estimate_height(
            &chain,
            target,
            BlockRef {
                height: 1000,
                time: head,
            },
            Duration::seconds(6),
        )
        .await
        .unwrap();
        // adjustment = 30s/10 = 3s, corrected = 9s, passed = floor(60/9) = 6
        assert_eq!(est.interval, Duration::seconds(9));
        assert_eq!(est.height, 994);
    }

    #[tokio::test]
    async fn zero_blocks_passed_skips_correction() {
        let head = datetime!(2024-01-10 0:00 UTC);
        let mut chain = FakeChain::regular(1000, head, Duration::seconds(6));
        // Head block stamped a minute late: diff is far out of tolerance, but
        // passed == 0 so no correction may be attempted.
        chain.set_time(1000, head + Duration::seconds(60));
        let est = estimate_height(
            &chain,
            head,
            BlockRef {
                height: 1000,
                time: head,
            },
            Duration::seconds(6),
        )
        .await
        .unwrap();
        assert_eq!(est.height, 1000);
        assert_eq!(est.interval, Duration::seconds(6));
    }

    #[tokio::test]
    async fn overshooting_correction_keeps_probe_height() {
        let head = datetime!(2024-01-10 0:00 UTC);
        let target = datetime!(2024-01-09 23:59:00 UTC);
        let mut chain = FakeChain::regular(1000, head, Duration::seconds(6));
        // Error of 90s over 10 blocks implies a negative interval.
        chain.set_time(990, target + Duration::seconds(90));
        let est = estimate_height(
            &chain,
            target,
            BlockRef {
                height: 1000,
                time: head,
            },
            Duration::seconds(6),
        )
        .await
        .unwrap();
        assert_eq!(est.height, 990);
        assert_eq!(est.interval, Duration::seconds(6));
    }

    #[tokio::test]
    async fn rejects_non_positive_interval() {
        let head = datetime!(2024-01-10 0:00 UTC);
        let chain = FakeChain::regular(1000, head, Duration::seconds(6));
        let r = estimate_height(
            &chain,
            head,
            BlockRef {
                height: 1000,
                time: head,
            },
            Duration::ZERO,
        )
        .await;
        assert!(matches!(r, Err(EstimateError::NonPositiveInterval(_))));
    }

    #[tokio::test]
    async fn rejects_target_after_reference() {
        let head = datetime!(2024-01-10 0:00 UTC);
        let chain = FakeChain::regular(1000, head, Duration::seconds(6));
        let r = estimate_height(
            &chain,
            head + Duration::seconds(1),
            BlockRef {
                height: 1000,
                time: head,
            },
            Duration::seconds(6),
        )
        .await;
        assert!(matches!(r, Err(EstimateError::TargetAfterReference { .. })));
    }

    #[tokio::test]
    async fn propagates_lookup_failure() {
        let head = datetime!(2024-01-10 0:00 UTC);
        let chain = FakeChain::regular(1000, head, Duration::seconds(6)).failing_next(1);
        let r = estimate_height(
            &chain,
            head - Duration::seconds(60),
            BlockRef {
                height: 1000,
                time: head,
            },
            Duration::seconds(6),
        )
        .await;
        assert!(matches!(r, Err(EstimateError::Chain(_))));
    }
}
