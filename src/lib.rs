//! iofuture: single-assignment result handles for asynchronous I/O operations.
//!
//! # Overview
//!
//! An I/O operation started on one thread often finishes on another. This crate
//! gives both sides a shared, thread-safe handle to the outcome: the producer
//! settles it exactly once, and any number of consumers can block on it, poll
//! it, await it, cancel it, or be notified when it settles.
//!
//! # Core Guarantees
//!
//! - **Single assignment**: the first terminal transition wins; later attempts are no-ops
//! - **Advisory cancellation**: consumers request, producers decide
//! - **No lost wakeups**: every blocked thread and pending task observes the transition
//! - **Contained callbacks**: a panicking notifier never poisons the handle or its siblings
//! - **Interruptible waits**: a blocked thread can be woken through its [`Interrupt`]
//!
//! # Module Structure
//!
//! - [`future`]: [`AsyncResult`], [`Completer`], notifiers and the async [`Wait`](future::Wait) future
//! - [`types`]: The [`Status`] enumeration
//! - [`error`]: Error types
//! - [`interrupt`]: Per-thread interruption of blocking waits
//! - [`config`]: Per-handle configuration and environment overrides

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_inception)]
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod error;
pub mod future;
pub mod interrupt;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports for convenient access to core types
pub use config::{ConfigError, FutureConfig, NotifierPanicResponse};
pub use error::{Error, ErrorKind, Result};
pub use future::{
    pair, AsyncResult, Builder, CancelAck, Completer, Handling, HandlingNotifier, Notifier,
    Settled,
};
pub use interrupt::Interrupt;
pub use types::Status;
