//! Deferred callback scheduling
//!
//! The throttler never touches a global timer registry. It is handed a
//! [`Scheduler`] and arms one-shot callbacks on it; a callback runs exactly
//! once after its delay and there is no way to cancel it.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, trace};

use crate::resize::error::SchedulerError;

/// One-shot callback run when a timer fires
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Capability to run a callback after a delay without blocking the caller
pub trait Scheduler: Send + Sync {
    fn arm(&self, delay: Duration, callback: TimerCallback);
}

/// Timers backed by the tokio runtime
///
/// Each armed callback is a spawned task that sleeps for the delay and then
/// runs the callback on a runtime worker.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler on the runtime the caller is running in
    pub fn current() -> Result<Self, SchedulerError> {
        let handle = Handle::try_current().map_err(|e| SchedulerError::NoRuntime(e.to_string()))?;
        Ok(Self::new(handle))
    }
}

impl Scheduler for TokioScheduler {
    fn arm(&self, delay: Duration, callback: TimerCallback) {
        trace!("Arming tokio timer for {:?}", delay);
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
    }
}

struct ArmedTimer {
    deadline: Duration,
    seq: u64,
    callback: TimerCallback,
}

#[derive(Default)]
struct VirtualClock {
    now: Duration,
    next_seq: u64,
    timers: Vec<ArmedTimer>,
}

/// Virtual clock for hosts that drive time themselves
///
/// Nothing happens until [`ManualScheduler::advance`] is called. Useful for
/// frame-stepped hosts and for deterministic tests.
#[derive(Default)]
pub struct ManualScheduler {
    clock: Mutex<VirtualClock>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of timers armed and not yet fired
    pub fn pending(&self) -> usize {
        self.lock().timers.len()
    }

    /// Move the clock forward, firing due timers in deadline order
    ///
    /// Returns the number of callbacks that ran. Callbacks may arm new timers;
    /// those fire within the same call if they fall due before the target.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now + by;
        let mut fired = 0;

        while let Some(timer) = self.pop_due(target) {
            trace!("Virtual timer {} fired at {:?}", timer.seq, timer.deadline);
            (timer.callback)();
            fired += 1;
        }

        self.lock().now = target;
        if fired > 0 {
            debug!("Advanced virtual clock to {:?}, fired {} timers", target, fired);
        }
        fired
    }

    fn pop_due(&self, target: Duration) -> Option<ArmedTimer> {
        let mut clock = self.lock();
        let index = clock
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.deadline <= target)
            .min_by_key(|(_, timer)| (timer.deadline, timer.seq))
            .map(|(index, _)| index)?;
        let timer = clock.timers.swap_remove(index);
        clock.now = timer.deadline;
        Some(timer)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VirtualClock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn arm(&self, delay: Duration, callback: TimerCallback) {
        let mut clock = self.lock();
        let deadline = clock.now + delay;
        let seq = clock.next_seq;
        clock.next_seq += 1;
        trace!("Arming virtual timer {} for {:?}", seq, deadline);
        clock.timers.push(ArmedTimer {
            deadline,
            seq,
            callback,
        });
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clock = self.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &clock.now)
            .field("pending", &clock.timers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> TimerCallback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let make = {
            let log = log.clone();
            move |label: &'static str| -> TimerCallback {
                let log = log.clone();
                Box::new(move || log.lock().unwrap().push(label))
            }
        };
        (log, make)
    }

    #[test]
    fn timers_fire_only_when_clock_reaches_deadline() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();

        scheduler.arm(Duration::from_millis(33), make("resize"));

        assert_eq!(scheduler.advance(Duration::from_millis(32)), 0);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
        assert_eq!(*log.lock().unwrap(), vec!["resize"]);
        assert_eq!(scheduler.now(), Duration::from_millis(33));
    }

    #[test]
    fn timers_fire_in_deadline_then_arm_order() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();

        scheduler.arm(Duration::from_millis(20), make("late"));
        scheduler.arm(Duration::from_millis(10), make("early"));
        scheduler.arm(Duration::from_millis(20), make("late-second"));

        assert_eq!(scheduler.advance(Duration::from_millis(50)), 3);
        assert_eq!(*log.lock().unwrap(), vec!["early", "late", "late-second"]);
    }

    #[test]
    fn callbacks_can_rearm() {
        let scheduler = Arc::new(ManualScheduler::new());
        let count = Arc::new(Mutex::new(0));

        let inner_count = count.clone();
        let inner_scheduler = scheduler.clone();
        scheduler.arm(
            Duration::from_millis(5),
            Box::new(move || {
                *inner_count.lock().unwrap() += 1;
                let again = inner_count.clone();
                inner_scheduler.arm(
                    Duration::from_millis(5),
                    Box::new(move || *again.lock().unwrap() += 1),
                );
            }),
        );

        assert_eq!(scheduler.advance(Duration::from_millis(10)), 2);
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn tokio_scheduler_requires_runtime() {
        assert!(matches!(TokioScheduler::current(), Err(SchedulerError::NoRuntime(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_fires_after_delay() {
        let scheduler = TokioScheduler::current().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();
        let start = tokio::time::Instant::now();

        scheduler.arm(
            Duration::from_millis(33),
            Box::new(move || {
                let _ = tx.send(tokio::time::Instant::now());
            }),
        );

        let fired_at = rx.await.unwrap();
        assert!(fired_at - start >= Duration::from_millis(33));
    }
}
