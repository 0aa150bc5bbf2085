//! Error types used by the runner and by user work.
//!
//! This module defines two error types:
//!
//! - [`RunnerError`] — invalid input at the API boundary (constructor/setters).
//! - [`WorkError`] — a failure reported by the user work for one cycle.
//!
//! Both provide `as_label` for logging/metrics. A `WorkError` is never
//! propagated to the caller of `start`/`stop`; it is recorded in
//! [`Runner::last_error`](crate::Runner::last_error) and handled according to
//! the runner's stop-on-error policy.

use thiserror::Error;

/// # Errors raised at the runner's API boundary.
///
/// These fail fast and synchronously, before any state mutation.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// Interval input was negative. Intervals are non-negative integer milliseconds.
    #[error("invalid interval {value}: expected a non-negative integer of milliseconds")]
    InvalidInterval {
        /// The rejected input value.
        value: i64,
    },
}

impl RunnerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use repeat_runner::RunnerError;
    ///
    /// let err = RunnerError::InvalidInterval { value: -5 };
    /// assert_eq!(err.as_label(), "invalid_interval");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunnerError::InvalidInterval { .. } => "invalid_interval",
        }
    }
}

/// # Failure of one work cycle.
///
/// Returned by [`Work::run`](crate::Work::run) to signal that the cycle failed.
/// The runner records it as `last_error` and either halts (stop-on-error) or
/// reschedules the next cycle. Cloneable so `last_error` can be read without
/// disturbing runner state.
///
/// # Example
/// ```
/// use repeat_runner::WorkError;
///
/// let err = WorkError::new("connection refused");
/// assert_eq!(err.message(), "connection refused");
/// assert_eq!(err.to_string(), "work failed: connection refused");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("work failed: {message}")]
pub struct WorkError {
    message: String,
}

impl WorkError {
    /// Creates a work error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for WorkError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for WorkError {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_interval_keeps_value() {
        let err = RunnerError::InvalidInterval { value: -42 };
        assert_eq!(err.as_label(), "invalid_interval");
        assert!(err.to_string().contains("-42"));
    }

    #[test]
    fn work_error_from_str_and_string() {
        let a: WorkError = "boom".into();
        let b: WorkError = String::from("boom").into();
        assert_eq!(a, b);
        assert_eq!(a.message(), "boom");
    }
}
