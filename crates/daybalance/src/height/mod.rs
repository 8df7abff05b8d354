//! Wall-clock to block-height resolution.

mod daily;
mod estimate;

pub use daily::{resolve_daily_heights, DailyHeights, ResolveError, MAX_CONSECUTIVE_FAILURES};
pub use estimate::{estimate_height, BlockRef, EstimateError, HeightEstimate, CLOCK_TOLERANCE};
