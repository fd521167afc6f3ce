//! Result handles for asynchronous operations.
//!
//! An operation is represented by two halves created together:
//!
//! - [`Completer`]: owned by the producer, settles the result exactly once
//! - [`AsyncResult`]: cloned freely among consumers, observes the result
//!
//! ```text
//!                   complete(v)
//!               ┌──────────────────► Done
//!               │  fail(e)
//!   Waiting ────┼──────────────────► Failed
//!               │  acknowledge_cancelled()
//!               └──────────────────► Cancelled
//! ```
//!
//! Each terminal status is final. Consumers may block ([`AsyncResult::wait`]),
//! poll ([`AsyncResult::status`]), await ([`AsyncResult::wait_async`]) or
//! register a [`Notifier`] to be called back.
//!
//! # Cancellation
//!
//! [`AsyncResult::cancel`] only *requests* cancellation. The producer observes
//! the request through [`Completer::is_cancel_requested`] or a handler
//! registered with [`Completer::on_cancel`], and decides whether to honor it
//! with [`Completer::acknowledge_cancelled`] or the handler's [`CancelAck`].
//!
//! # Example
//!
//! ```
//! use std::thread;
//! use iofuture::future::pair;
//! use iofuture::types::Status;
//!
//! let (completer, result) = pair::<u32>();
//! let producer = thread::spawn(move || {
//!     completer.complete(42);
//! });
//!
//! assert_eq!(result.wait(), Status::Done);
//! assert_eq!(result.get().unwrap(), 42);
//! producer.join().unwrap();
//! ```

mod completer;
mod handle;
mod notifier;
mod state;
mod wait;

use std::sync::Arc;

pub use completer::{CancelAck, Completer};
pub use handle::{AsyncResult, Settled};
pub use notifier::{Handling, HandlingNotifier, Notifier};
pub use wait::Wait;

use crate::config::{ConfigError, FutureConfig, NotifierPanicResponse};
use state::Shared;

/// Creates a completer and its result handle with default configuration.
///
/// Environment overrides are not consulted; use [`Builder::from_env`] for that.
#[must_use]
pub fn pair<T>() -> (Completer<T>, AsyncResult<T>) {
    Builder::new().build()
}

/// Builder for configuring result handles.
///
/// # Example
///
/// ```
/// use iofuture::config::NotifierPanicResponse;
/// use iofuture::future::Builder;
///
/// let (completer, result) = Builder::new()
///     .label("resolve example.org")
///     .notifier_panic(NotifierPanicResponse::Silent)
///     .build::<Vec<u8>>();
///
/// assert_eq!(result.label(), Some("resolve example.org"));
/// completer.complete(vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone, Default)]
#[must_use = "a builder does nothing until build() is called"]
pub struct Builder {
    config: FutureConfig,
}

impl Builder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder seeded from `IOFUTURE_*` environment variables.
    ///
    /// Values set afterwards through builder methods take precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set to a value
    /// that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            config: FutureConfig::from_env()?,
        })
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: FutureConfig) -> Self {
        self.config = config;
        self
    }

    /// Labels the handle in log events.
    pub fn label(mut self, label: impl AsRef<str>) -> Self {
        self.config.label = Some(Arc::from(label.as_ref()));
        self
    }

    /// Sets how panicking notifiers and cancel handlers are reported.
    pub fn notifier_panic(mut self, response: NotifierPanicResponse) -> Self {
        self.config.notifier_panic = response;
        self
    }

    /// Creates a completer and its result handle.
    #[must_use]
    pub fn build<T>(&self) -> (Completer<T>, AsyncResult<T>) {
        let shared = Arc::new(Shared::new(self.config.clone()));
        tracing::trace!(label = %shared.label(), "result handle created");
        let result = AsyncResult::from_shared(Arc::clone(&shared));
        (Completer::new(shared), result)
    }
}
