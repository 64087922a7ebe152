//! Size change reporting
//!
//! - [`throttler`] - `Idle`/`Pending` machine that coalesces resize bursts
//! - [`scheduler`] - Timer capability the throttler arms its window on
//!
//! Explicit size requests bypass the throttle; window resize signals produce
//! at most one emission per window.

pub mod error;
pub mod scheduler;
pub mod throttler;

pub use error::SchedulerError;
pub use scheduler::{ManualScheduler, Scheduler, TimerCallback, TokioScheduler};
pub use throttler::{ResizeThrottler, ThrottleSettings, DEFAULT_RESIZE_THROTTLE_MS};
