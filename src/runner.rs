//! # Runner: the self-rescheduling cycle loop.
//!
//! One run session = one spawned drive loop plus one cancellation token. Each
//! iteration of the loop is a **cycle**: invoke the work, wait for it to
//! settle, then decide — reschedule after the current interval, or exit.
//!
//! ## Cycle flow
//! ```text
//! start(-1) ──► Phase::Running{token, gen} ──► drive loop
//! start(d)  ──► Phase::ArmedStart ──► [sleep d] ──► Phase::Running ──► drive loop
//!
//! loop {
//!   ├─► publish CycleStarting
//!   ├─► work.run(runner) ──► Ok  ──► clear last_error, publish CycleCompleted
//!   │                    └─► Err ──► record last_error, publish CycleFailed
//!   │                                └─ stop_when_error ──► idle, exit
//!   ├─► token canceled? ──► exit (no reschedule)
//!   ├─► publish RescheduleArmed(interval read NOW)
//!   └─► select { sleep(interval), token.cancelled() ──► exit }
//! }
//! ```
//!
//! ## Rules
//! - Cycles run **sequentially** within one session (never parallel).
//! - The reschedule delay is the interval in effect **at that scheduling
//!   decision**; an interval change never touches an already-armed timer.
//! - Cancellation is cooperative: it is observed after settlement and it kills
//!   an armed timer, but it cannot preempt work mid-execution.
//! - A deferred `stop(d)` cancels **whichever token is current when its timer
//!   fires**, never the token captured when `stop` was called.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::error::{RunnerError, WorkError};
use crate::events::{Bus, Event, EventKind};
use crate::work::WorkRef;

/// Capacity of the lifecycle event channel.
const BUS_CAPACITY: usize = 256;

/// Where the runner currently is in its lifecycle.
///
/// A pending deferred stop is not a distinct phase: the runner stays
/// `Running` (and observably so) until the stop timer fires.
enum Phase {
    /// No session; `start` may begin one.
    Idle,
    /// A delayed start is pending; `start` and `stop` are no-ops in this window.
    ArmedStart,
    /// A session is live. `token` cancels it; `gen` identifies it so a cycle
    /// that halts itself can verify it has not been superseded.
    Running { token: CancellationToken, gen: u64 },
}

struct RunnerInner {
    phase: Mutex<Phase>,
    work: Mutex<WorkRef>,
    last_error: Mutex<Option<WorkError>>,
    interval_ms: AtomicU64,
    stop_when_error: bool,
    next_gen: AtomicU64,
    bus: Bus,
}

/// # Self-rescheduling task runner.
///
/// Repeatedly invokes an async [`Work`](crate::Work), waiting for each cycle
/// to settle before arming the next one after the configured interval.
/// `Runner` is a cheap-to-clone handle (`Arc`-backed); the work callable
/// receives a clone of it, so a cycle can stop the runner or mutate its
/// interval/work from inside.
///
/// Delays and intervals are integer milliseconds. A negative delay to
/// [`start`](Runner::start)/[`stop`](Runner::stop) means "act now"; a negative
/// interval is rejected with [`RunnerError::InvalidInterval`].
///
/// ## Example
/// ```rust
/// use repeat_runner::{Runner, WorkError, WorkFn, WorkRef};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), repeat_runner::RunnerError> {
/// let work: WorkRef = WorkFn::arc(|_runner: Runner| async move {
///     // poll something...
///     Ok::<_, WorkError>(())
/// });
///
/// let runner = Runner::new(work, 10, false)?;
/// runner.start(-1);
/// assert!(runner.is_running());
///
/// tokio::time::sleep(std::time::Duration::from_millis(35)).await;
/// runner.stop(-1);
/// assert!(!runner.is_running());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Runner {
    inner: Arc<RunnerInner>,
}

impl Runner {
    /// Creates an idle runner.
    ///
    /// ### Parameters
    /// - `work`: the unit executed each cycle
    /// - `interval_ms`: milliseconds between one cycle's settlement and the
    ///   next cycle (must be non-negative)
    /// - `stop_when_error`: if true, a failed cycle halts the runner; if
    ///   false, the failure is recorded and the runner keeps going
    ///
    /// ### Errors
    /// [`RunnerError::InvalidInterval`] if `interval_ms` is negative; no state
    /// is created in that case.
    pub fn new(work: WorkRef, interval_ms: i64, stop_when_error: bool) -> Result<Self, RunnerError> {
        if interval_ms < 0 {
            return Err(RunnerError::InvalidInterval { value: interval_ms });
        }
        Ok(Self {
            inner: Arc::new(RunnerInner {
                phase: Mutex::new(Phase::Idle),
                work: Mutex::new(work),
                last_error: Mutex::new(None),
                interval_ms: AtomicU64::new(interval_ms as u64),
                stop_when_error,
                next_gen: AtomicU64::new(0),
                bus: Bus::new(BUS_CAPACITY),
            }),
        })
    }

    /// Starts the runner.
    ///
    /// - Already running, or a delayed start already armed: no-op.
    /// - `delay_ms < 0`: the session begins now; [`is_running`](Runner::is_running)
    ///   is true when this returns. The first cycle executes on the runtime.
    /// - `delay_ms >= 0`: arms a timer that begins the session when it fires;
    ///   `is_running` stays false until then.
    ///
    /// Returns the runner for chaining. Must be called within a tokio runtime.
    pub fn start(&self, delay_ms: i64) -> &Self {
        let mut phase = self.lock_phase();
        if !matches!(*phase, Phase::Idle) {
            return self;
        }

        if delay_ms < 0 {
            RunnerInner::begin_session(&self.inner, &mut phase);
        } else {
            *phase = Phase::ArmedStart;
            let delay = Duration::from_millis(delay_ms as u64);
            self.inner
                .bus
                .publish(Event::now(EventKind::StartArmed).with_delay(delay));

            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                time::sleep(delay).await;
                let mut phase = inner.lock_phase();
                // The arm timer is the only way out of ArmedStart.
                if matches!(*phase, Phase::ArmedStart) {
                    RunnerInner::begin_session(&inner, &mut phase);
                }
            });
        }
        self
    }

    /// Stops the runner.
    ///
    /// - Not running (idle, or only a delayed start armed): no-op.
    /// - `delay_ms < 0`: cancels the current session now; `is_running` is
    ///   false when this returns, and any armed reschedule timer dies with it.
    /// - `delay_ms >= 0`: arms a timer whose action at fire time is to cancel
    ///   whichever session is current **at that moment**. The runner may have
    ///   settled cycles, stopped, or even restarted in the meantime; the timer
    ///   resolves the current token when it fires, never one captured here.
    ///
    /// Returns the runner immediately (does not wait for the delay).
    pub fn stop(&self, delay_ms: i64) -> &Self {
        let mut phase = self.lock_phase();
        let Phase::Running { token, .. } = &*phase else {
            return self;
        };

        if delay_ms < 0 {
            token.cancel();
            *phase = Phase::Idle;
            self.inner.bus.publish(Event::now(EventKind::RunnerStopped));
        } else {
            let delay = Duration::from_millis(delay_ms as u64);
            self.inner
                .bus
                .publish(Event::now(EventKind::StopArmed).with_delay(delay));

            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                time::sleep(delay).await;
                inner.cancel_current();
            });
        }
        self
    }

    /// True while a session is live: from the instant a cycle begins until it
    /// is canceled or halted by stop-on-error. False during a delayed-start
    /// window.
    pub fn is_running(&self) -> bool {
        matches!(*self.lock_phase(), Phase::Running { .. })
    }

    /// The failure recorded by the most recent failed cycle, cleared by the
    /// next successful one.
    pub fn last_error(&self) -> Option<WorkError> {
        self.inner
            .last_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Current interval in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        self.inner.interval_ms.load(AtomicOrdering::Relaxed)
    }

    /// Replaces the interval used by **future** scheduling decisions.
    ///
    /// An already-armed reschedule timer keeps the delay it was armed with.
    ///
    /// ### Errors
    /// [`RunnerError::InvalidInterval`] on negative input; state is unchanged.
    pub fn set_interval_ms(&self, value: i64) -> Result<(), RunnerError> {
        if value < 0 {
            return Err(RunnerError::InvalidInterval { value });
        }
        self.inner
            .interval_ms
            .store(value as u64, AtomicOrdering::Relaxed);
        Ok(())
    }

    /// Current work handle.
    pub fn work(&self) -> WorkRef {
        self.inner
            .work
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replaces the work. The **next** cycle to begin uses it; a cycle already
    /// in flight keeps the callable it was invoked with.
    pub fn set_work(&self, work: WorkRef) {
        *self.inner.work.lock().unwrap_or_else(|e| e.into_inner()) = work;
    }

    /// The stop-on-error policy fixed at construction.
    pub fn stop_when_error(&self) -> bool {
        self.inner.stop_when_error
    }

    /// Creates a receiver for lifecycle [`Event`]s published after this call.
    ///
    /// Fire-and-forget broadcast: slow receivers observe
    /// `RecvError::Lagged(n)` and skip the `n` oldest events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    fn lock_phase(&self) -> MutexGuard<'_, Phase> {
        self.inner.lock_phase()
    }
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("is_running", &self.is_running())
            .field("interval_ms", &self.interval_ms())
            .field("stop_when_error", &self.inner.stop_when_error)
            .finish_non_exhaustive()
    }
}

impl RunnerInner {
    fn lock_phase(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Begins a session under the already-held phase lock: binds a fresh token
    /// and generation, then spawns the drive loop.
    fn begin_session(inner: &Arc<Self>, phase: &mut Phase) {
        let gen = inner.next_gen.fetch_add(1, AtomicOrdering::Relaxed) + 1;
        let token = CancellationToken::new();
        *phase = Phase::Running {
            token: token.clone(),
            gen,
        };
        tokio::spawn(drive(Arc::clone(inner), token, gen));
    }

    /// Cancels whichever session is current right now, if any.
    ///
    /// This is the action of a deferred stop timer: it must resolve the token
    /// at fire time. No-op when idle or only armed to start.
    fn cancel_current(&self) {
        let mut phase = self.lock_phase();
        if let Phase::Running { token, .. } = &*phase {
            token.cancel();
            *phase = Phase::Idle;
            self.bus.publish(Event::now(EventKind::RunnerStopped));
        }
    }

    /// Transitions to idle from inside the drive loop (stop-on-error path),
    /// but only if generation `gen` is still the current session — a stop or
    /// stop/start pair may have superseded it while the work was settling.
    fn halt_session(&self, gen: u64, error: &WorkError) {
        let mut phase = self.lock_phase();
        if let Phase::Running {
            token,
            gen: current,
        } = &*phase
        {
            if *current == gen {
                token.cancel();
                *phase = Phase::Idle;
                self.bus.publish(
                    Event::now(EventKind::RunnerStopped).with_error(error.to_string()),
                );
            }
        }
    }
}

/// One run session: execute cycles until canceled or halted by policy.
async fn drive(inner: Arc<RunnerInner>, token: CancellationToken, gen: u64) {
    let mut cycle: u64 = 0;

    loop {
        if token.is_cancelled() {
            break;
        }
        cycle += 1;

        // Snapshot the work: a swap mid-flight affects the next cycle only.
        let work = inner.work.lock().unwrap_or_else(|e| e.into_inner()).clone();

        inner
            .bus
            .publish(Event::now(EventKind::CycleStarting).with_cycle(cycle));

        let runner = Runner {
            inner: Arc::clone(&inner),
        };
        match work.run(runner).await {
            Ok(()) => {
                *inner
                    .last_error
                    .lock()
                    .unwrap_or_else(|e| e.into_inner()) = None;
                inner
                    .bus
                    .publish(Event::now(EventKind::CycleCompleted).with_cycle(cycle));
            }
            Err(err) => {
                inner.bus.publish(
                    Event::now(EventKind::CycleFailed)
                        .with_cycle(cycle)
                        .with_error(err.to_string()),
                );
                *inner
                    .last_error
                    .lock()
                    .unwrap_or_else(|e| e.into_inner()) = Some(err.clone());
                if inner.stop_when_error {
                    inner.halt_session(gen, &err);
                    break;
                }
            }
        }

        // Canceled while the work was settling: exit without rescheduling.
        if token.is_cancelled() {
            break;
        }

        // The interval in effect at THIS decision, not at cycle start.
        let delay = Duration::from_millis(inner.interval_ms.load(AtomicOrdering::Relaxed));
        inner.bus.publish(
            Event::now(EventKind::RescheduleArmed)
                .with_cycle(cycle)
                .with_delay(delay),
        );

        select! {
            _ = time::sleep(delay) => {}
            _ = token.cancelled() => break,
        }
    }
}
