//! # repeat-runner
//!
//! **repeat-runner** is a self-rescheduling async task runner for tokio.
//!
//! Give it a unit of work and an interval: it invokes the work, waits for it
//! to settle, and — unless canceled — arms the next invocation after the
//! interval in effect at that moment. Start and stop are race-safe and may be
//! delayed; the interval and the work itself can be swapped while running.
//!
//! ## Architecture
//! ```text
//!            ┌─────────────────────────────────────────────┐
//!            │  Runner (cheap-clone handle, Arc-backed)    │
//!            │  - Phase: Idle / ArmedStart / Running       │
//!            │  - interval_ms, work, last_error            │
//!            │  - Bus (broadcast lifecycle events)         │
//!            └───────┬─────────────────────────────────────┘
//!                    │ start(delay)
//!                    ▼
//!            ┌──────────────────┐      session token + generation
//!            │   drive loop     │◄──── (exactly one live at a time)
//!            └───────┬──────────┘
//!                    │
//!  loop {            ▼
//!    ├─► publish CycleStarting
//!    ├─► work.run(runner)  ── Ok ──► clear last_error, CycleCompleted
//!    │                     └─ Err ─► record last_error, CycleFailed
//!    │                               └─ stop_when_error ─► RunnerStopped, exit
//!    ├─► token canceled? ─► exit (no reschedule)
//!    ├─► publish RescheduleArmed (interval read at this decision)
//!    └─► select { sleep(interval), token.cancelled() ─► exit }
//!  }
//! ```
//!
//! ## Lifecycle
//! ```text
//! Idle ──start(-1)──► Running ──stop(-1)──────────► Idle
//! Idle ──start(d)───► ArmedStart ──timer──► Running
//! Running ──stop(d)──► (still Running) ──timer──► Idle
//! Running ──cycle fails & stop_when_error──► Idle
//! Running ──cycle settles, not canceled──► Running (rearmed)
//!
//! start while Running/ArmedStart: no-op.  stop while Idle/ArmedStart: no-op.
//! ```
//!
//! A deferred `stop(d)` does **not** capture the session it saw when armed: at
//! fire time it cancels whichever session is current — the runner may have
//! cycled, stopped, or restarted in between.
//!
//! ## Features
//! | Area           | Description                                               | Key types                     |
//! |----------------|-----------------------------------------------------------|-------------------------------|
//! | **Runner**     | Start/stop (optionally delayed), runtime interval/work.   | [`Runner`]                    |
//! | **Work**       | Define work as a trait impl or a closure.                 | [`Work`], [`WorkFn`], [`WorkRef`] |
//! | **Errors**     | Typed errors for bad input and failed cycles.             | [`RunnerError`], [`WorkError`] |
//! | **Events**     | Observe every lifecycle edge via a broadcast channel.     | [`Event`], [`EventKind`]      |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//! use repeat_runner::{Runner, WorkError, WorkFn, WorkRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), repeat_runner::RunnerError> {
//!     let hits = Arc::new(AtomicUsize::new(0));
//!
//!     let counter = Arc::clone(&hits);
//!     let work: WorkRef = WorkFn::arc(move |_runner: Runner| {
//!         let counter = Arc::clone(&counter);
//!         async move {
//!             counter.fetch_add(1, Ordering::Relaxed);
//!             Ok::<_, WorkError>(())
//!         }
//!     });
//!
//!     // run every 10ms, keep going on errors
//!     let runner = Runner::new(work, 10, false)?;
//!     runner.start(-1);
//!     assert!(runner.is_running());
//!
//!     tokio::time::sleep(Duration::from_millis(35)).await;
//!     runner.stop(-1);
//!
//!     assert!(!runner.is_running());
//!     assert!(hits.load(Ordering::Relaxed) >= 2);
//!     Ok(())
//! }
//! ```

mod error;
mod events;
mod runner;
mod work;

// ---- Public re-exports ----

pub use error::{RunnerError, WorkError};
pub use events::{Event, EventKind};
pub use runner::Runner;
pub use work::{Work, WorkFn, WorkRef};
