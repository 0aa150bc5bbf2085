//! # Lifecycle events emitted by the runner.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Arming events**: a timer was armed (delayed start, delayed stop, reschedule)
//! - **Cycle events**: work execution flow (starting, completed, failed, runner stopped)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! cycle number within the current run session, delays, and failure messages.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use repeat_runner::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::CycleFailed)
//!     .with_cycle(3)
//!     .with_error("boom");
//!
//! assert_eq!(ev.kind, EventKind::CycleFailed);
//! assert_eq!(ev.cycle, Some(3));
//! assert_eq!(ev.error.as_deref(), Some("boom"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runner lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Arming events ===
    /// A delayed start was armed; the first cycle begins when the timer fires.
    ///
    /// Sets:
    /// - `delay`: the start delay
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    StartArmed,

    /// A delayed stop was armed; whichever cycle is current when the timer
    /// fires gets canceled.
    ///
    /// Sets:
    /// - `delay`: the stop delay
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    StopArmed,

    /// The next cycle was scheduled after a settled cycle.
    ///
    /// Sets:
    /// - `cycle`: the cycle that just settled (1-based, per run session)
    /// - `delay`: the interval in effect at this scheduling decision
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RescheduleArmed,

    // === Cycle events ===
    /// A cycle is about to invoke the work.
    ///
    /// Sets:
    /// - `cycle`: cycle number (1-based, per run session)
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CycleStarting,

    /// A cycle settled successfully.
    ///
    /// Sets:
    /// - `cycle`: cycle number
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CycleCompleted,

    /// A cycle settled with a failure.
    ///
    /// Sets:
    /// - `cycle`: cycle number
    /// - `error`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CycleFailed,

    /// The runner transitioned to idle (explicit stop, deferred stop firing,
    /// or a failed cycle under the stop-on-error policy).
    ///
    /// Sets:
    /// - `error`: failure message when stop-on-error halted the runner
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RunnerStopped,
}

/// A lifecycle event with metadata.
///
/// Constructed via [`Event::now`] and enriched with `with_*` builders.
/// Every event gets a wall-clock timestamp and a globally monotonic `seq`.
#[derive(Debug, Clone)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Wall-clock timestamp at creation.
    pub at: SystemTime,
    /// Globally monotonic sequence number.
    pub seq: u64,
    /// Cycle number within the current run session (1-based), when applicable.
    pub cycle: Option<u64>,
    /// Armed delay (start/stop delay or reschedule interval), when applicable.
    pub delay: Option<Duration>,
    /// Failure message, when applicable.
    pub error: Option<String>,
}

impl Event {
    /// Creates an event stamped with the current time and the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            kind,
            at: SystemTime::now(),
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            cycle: None,
            delay: None,
            error: None,
        }
    }

    /// Attaches the cycle number.
    pub fn with_cycle(mut self, cycle: u64) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// Attaches an armed delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Attaches a failure message.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
