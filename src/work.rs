//! # Work abstraction and function-backed implementation.
//!
//! This module defines the [`Work`] trait (the async unit executed each cycle)
//! and a convenient function-backed implementation [`WorkFn`]. The common
//! handle type is [`WorkRef`], an `Arc<dyn Work>` suitable for sharing with
//! the runner and swapping at runtime.
//!
//! Work receives the [`Runner`] handle itself, so a cycle can inspect state or
//! control the runner from inside (read the interval, call
//! [`stop`](Runner::stop), replace the work for the next cycle).

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::WorkError;
use crate::runner::Runner;

/// Shared handle to a work implementation.
pub type WorkRef = Arc<dyn Work>;

/// # Asynchronous unit of work, executed once per cycle.
///
/// A `Work` has an async [`run`](Work::run) method that receives the owning
/// [`Runner`] handle. Returning `Err` marks the cycle as failed: the failure is
/// recorded as `last_error` and, under the stop-on-error policy, halts the
/// runner.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use repeat_runner::{Runner, Work, WorkError};
///
/// struct Poll;
///
/// #[async_trait]
/// impl Work for Poll {
///     async fn run(&self, runner: Runner) -> Result<(), WorkError> {
///         if runner.interval_ms() > 60_000 {
///             // polling this slowly is pointless, shut ourselves down
///             runner.stop(-1);
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Work: Send + Sync + 'static {
    /// Executes one cycle.
    ///
    /// `runner` is a cheap clone of the handle that scheduled this cycle.
    async fn run(&self, runner: Runner) -> Result<(), WorkError>;
}

/// Function-backed work implementation.
///
/// Wraps a closure that *creates* a new future per cycle, so there is no
/// shared mutable state between cycles unless the closure captures an
/// `Arc<...>` explicitly.
///
/// ## Example
/// ```rust
/// use repeat_runner::{Runner, WorkError, WorkFn, WorkRef};
///
/// let w: WorkRef = WorkFn::arc(|_runner: Runner| async move {
///     // do work...
///     Ok::<_, WorkError>(())
/// });
/// ```
#[derive(Debug)]
pub struct WorkFn<F> {
    f: F,
}

impl<F> WorkFn<F> {
    /// Creates new function-backed work.
    ///
    /// Prefer [`WorkFn::arc`] when you immediately need a [`WorkRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the work and returns it as a shared handle (`Arc<dyn Work>` after coercion).
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Work for WorkFn<F>
where
    F: Fn(Runner) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), WorkError>> + Send + 'static,
{
    async fn run(&self, runner: Runner) -> Result<(), WorkError> {
        (self.f)(runner).await
    }
}
