//! # Lifecycle events published by the runner.
//!
//! This module provides the observability fabric:
//! - [`Event`] / [`EventKind`] — what happened, with metadata and a global sequence number
//! - [`Bus`] — non-blocking broadcast channel the runner publishes into

mod bus;
mod event;

pub(crate) use bus::Bus;
pub use event::{Event, EventKind};
