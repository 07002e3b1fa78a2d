//! Wall-clock-anchored cycle scheduler shared by every showcase entity.
//!
//! Advance events land on a fixed grid (`t ≡ 0 mod period` in Unix
//! milliseconds), so entities mounted at different moments change together.

mod clock;
mod cycle;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cycle::{AdvanceEvent, CycleScheduler, DEFAULT_PERIOD_MS, SchedulerConfig, aligned_next_fire};
