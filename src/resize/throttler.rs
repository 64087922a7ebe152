//! Resize throttling
//!
//! Window resize signals arrive in bursts. The throttler turns a burst into at
//! most one `sizeChanges` emission per window, while explicit size requests
//! are answered immediately.
//!
//! ```text
//!                 on_resize_signal (arm timer)
//!        ┌──────┐ ───────────────────────────► ┌─────────┐
//!        │ Idle │                              │ Pending │ ◄─┐ on_resize_signal
//!        └──────┘ ◄─────────────────────────── └─────────┘ ──┘ (dropped)
//!                   timer fires: read size, emit
//! ```

use serde::{Deserialize, Serialize};
use statum::{machine, state};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

use crate::geometry::{read_size, ReferenceElement, Size};
use crate::ports::{PortSink, SinkError};
use crate::resize::scheduler::Scheduler;

/// Roughly one frame at 30fps
pub const DEFAULT_RESIZE_THROTTLE_MS: u64 = 33;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleSettings {
    /// Length of one throttle window in milliseconds
    pub window_ms: u64,
}

impl ThrottleSettings {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_RESIZE_THROTTLE_MS,
        }
    }
}

#[state]
#[derive(Debug, Clone)]
pub enum ThrottleState {
    Idle,
    Pending,
}

#[machine]
pub struct SizeThrottle<S: ThrottleState> {
    // Reference element the size is read from
    element: Arc<dyn ReferenceElement>,

    // Application core inbound channels
    sink: Arc<dyn PortSink>,

    // Number of windows closed so far
    windows_closed: u64,
}

// Methods available in all states
impl<S: ThrottleState> SizeThrottle<S> {
    fn current_size(&self) -> Size {
        read_size(self.element.as_ref())
    }

    fn sink(&self) -> Arc<dyn PortSink> {
        self.sink.clone()
    }

    fn windows_closed(&self) -> u64 {
        self.windows_closed
    }
}

impl SizeThrottle<Idle> {
    fn create(element: Arc<dyn ReferenceElement>, sink: Arc<dyn PortSink>) -> Self {
        Self::new(element, sink, 0)
    }

    fn open_window(self) -> SizeThrottle<Pending> {
        debug!("Resize signal received, opening throttle window");
        self.transition()
    }
}

impl SizeThrottle<Pending> {
    // Size is read at expiry so the emission reflects the latest layout
    fn close_window(mut self) -> (SizeThrottle<Idle>, Size) {
        let size = self.current_size();
        self.windows_closed += 1;
        debug!(
            "Throttle window {} closed with size {}x{}",
            self.windows_closed, size.width, size.height
        );
        (self.transition(), size)
    }
}

enum ThrottleMachine {
    Idle(SizeThrottle<Idle>),
    Pending(SizeThrottle<Pending>),
}

impl ThrottleMachine {
    fn current_size(&self) -> Size {
        match self {
            ThrottleMachine::Idle(machine) => machine.current_size(),
            ThrottleMachine::Pending(machine) => machine.current_size(),
        }
    }

    fn sink(&self) -> Arc<dyn PortSink> {
        match self {
            ThrottleMachine::Idle(machine) => machine.sink(),
            ThrottleMachine::Pending(machine) => machine.sink(),
        }
    }

    fn windows_closed(&self) -> u64 {
        match self {
            ThrottleMachine::Idle(machine) => machine.windows_closed(),
            ThrottleMachine::Pending(machine) => machine.windows_closed(),
        }
    }
}

// `None` only while a transition is in flight under the lock
type SharedMachine = Arc<Mutex<Option<ThrottleMachine>>>;

/// Coalesces resize signals into throttled `sizeChanges` emissions
///
/// Cloning yields another handle to the same throttler. Emission happens after
/// the internal lock is released, so a sink may call back into the throttler.
#[derive(Clone)]
pub struct ResizeThrottler {
    machine: SharedMachine,
    scheduler: Arc<dyn Scheduler>,
    settings: ThrottleSettings,
}

impl ResizeThrottler {
    pub fn new(
        element: Arc<dyn ReferenceElement>,
        sink: Arc<dyn PortSink>,
        scheduler: Arc<dyn Scheduler>,
        settings: ThrottleSettings,
    ) -> Self {
        info!(
            "Creating resize throttler with {}ms window",
            settings.window_ms
        );
        let machine = ThrottleMachine::Idle(SizeThrottle::create(element, sink));
        Self {
            machine: Arc::new(Mutex::new(Some(machine))),
            scheduler,
            settings,
        }
    }

    pub fn settings(&self) -> &ThrottleSettings {
        &self.settings
    }

    /// Emit the current size right away, whatever the throttle state
    pub fn request_size(&self) -> Result<Size, SinkError> {
        let (size, sink) = {
            let guard = lock(&self.machine);
            match guard.as_ref() {
                Some(machine) => (machine.current_size(), machine.sink()),
                None => {
                    error!("Throttle machine missing during size request");
                    return Ok(Size::default());
                }
            }
        };
        debug!("Size requested: {}x{}", size.width, size.height);
        sink.size_changes(size)?;
        Ok(size)
    }

    /// Handle one window resize signal
    ///
    /// Returns `true` when this signal armed a new timer, `false` when a
    /// window was already open and the signal was dropped.
    pub fn on_resize_signal(&self) -> bool {
        {
            let mut guard = lock(&self.machine);
            match guard.take() {
                Some(ThrottleMachine::Idle(idle)) => {
                    *guard = Some(ThrottleMachine::Pending(idle.open_window()));
                }
                Some(pending @ ThrottleMachine::Pending(_)) => {
                    trace!("Resize signal dropped, throttle window already open");
                    *guard = Some(pending);
                    return false;
                }
                None => {
                    error!("Throttle machine missing during resize signal");
                    return false;
                }
            }
        }

        let machine = self.machine.clone();
        self.scheduler
            .arm(self.settings.window(), Box::new(move || fire(&machine)));
        true
    }

    /// Whether a timer is armed
    pub fn is_pending(&self) -> bool {
        matches!(
            lock(&self.machine).as_ref(),
            Some(ThrottleMachine::Pending(_))
        )
    }

    /// Number of emissions that came from fired timers
    pub fn emitted(&self) -> u64 {
        lock(&self.machine)
            .as_ref()
            .map(ThrottleMachine::windows_closed)
            .unwrap_or(0)
    }
}

fn fire(machine: &Mutex<Option<ThrottleMachine>>) {
    let (size, sink) = {
        let mut guard = lock(machine);
        match guard.take() {
            Some(ThrottleMachine::Pending(pending)) => {
                let (idle, size) = pending.close_window();
                let sink = idle.sink();
                *guard = Some(ThrottleMachine::Idle(idle));
                (size, sink)
            }
            other => {
                error!("Throttle timer fired without an open window");
                *guard = other;
                return;
            }
        }
    };

    if let Err(e) = sink.size_changes(size) {
        warn!("Dropped throttled size {}x{}: {}", size.width, size.height, e);
    }
}

fn lock(machine: &Mutex<Option<ThrottleMachine>>) -> MutexGuard<'_, Option<ThrottleMachine>> {
    machine.lock().unwrap_or_else(PoisonError::into_inner)
}
