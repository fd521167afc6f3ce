//! The consumer side of a result: [`AsyncResult`].

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::FutureConfig;
use crate::error::{Error, Result};
use crate::types::Status;

use super::notifier::Notifier;
use super::state::{deadline_after, Outcome, PendingNotifier, Shared};
use super::wait::Wait;

/// Snapshot of a settled result.
#[derive(Debug)]
pub enum Settled<T> {
    /// The operation produced a value.
    Done(Arc<T>),
    /// The operation failed with this reason.
    Failed(Arc<io::Error>),
    /// The operation was cancelled.
    Cancelled,
}

impl<T> Clone for Settled<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Done(value) => Self::Done(Arc::clone(value)),
            Self::Failed(failure) => Self::Failed(Arc::clone(failure)),
            Self::Cancelled => Self::Cancelled,
        }
    }
}

impl<T> Settled<T> {
    /// Returns the terminal status this snapshot represents.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Done(_) => Status::Done,
            Self::Failed(_) => Status::Failed,
            Self::Cancelled => Status::Cancelled,
        }
    }
}

/// Handle to the eventual outcome of an asynchronous operation.
///
/// Cloning the handle is cheap; all clones observe the same result. The
/// handle cannot complete the operation: only the paired
/// [`Completer`](super::Completer) can. Consumers may request cancellation,
/// which the producer is free to honor or ignore.
///
/// # Waiting
///
/// | Method | Blocks | Interruptible | On timeout |
/// |--------|--------|---------------|------------|
/// | [`status`](Self::status) | no | - | - |
/// | [`wait`](Self::wait) | yes | no | - |
/// | [`wait_timeout`](Self::wait_timeout) | yes | no | `Status::Waiting` |
/// | [`wait_interruptibly`](Self::wait_interruptibly) | yes | yes | - |
/// | [`wait_interruptibly_timeout`](Self::wait_interruptibly_timeout) | yes | yes | `Status::Waiting` |
/// | [`wait_async`](Self::wait_async) | no (async) | - | - |
pub struct AsyncResult<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for AsyncResult<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> AsyncResult<T> {
    pub(crate) const fn from_shared(shared: Arc<Shared<T>>) -> Self {
        Self { shared }
    }

    /// Creates a handle that has already completed with `value`.
    #[must_use]
    pub fn done(value: T) -> Self {
        Self::settled_with(Outcome::Done(Arc::new(value)))
    }

    /// Creates a handle that has already failed with `failure`.
    #[must_use]
    pub fn failed(failure: io::Error) -> Self {
        Self::settled_with(Outcome::Failed(Arc::new(failure)))
    }

    /// Creates a handle that has already been cancelled.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::settled_with(Outcome::Cancelled)
    }

    fn settled_with(outcome: Outcome<T>) -> Self {
        Self::from_shared(Arc::new(Shared::with_outcome(
            FutureConfig::default(),
            outcome,
        )))
    }

    /// Returns the label given at construction, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.shared.config.label.as_deref()
    }

    /// Returns true if both handles observe the same result.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Requests cancellation of the operation.
    ///
    /// The request is advisory: it never blocks and never changes the status
    /// by itself. The producer decides whether to acknowledge it. Requests
    /// made after the result settled, or after an earlier request, are no-ops.
    ///
    /// Producer cancel handlers registered with
    /// [`Completer::on_cancel`](super::Completer::on_cancel) run on this
    /// thread before `cancel` returns.
    pub fn cancel(&self) -> &Self {
        let handlers = {
            let mut state = self.shared.state.lock();
            if !state.outcome.is_waiting() || state.cancel_requested {
                return self;
            }
            state.cancel_requested = true;
            std::mem::take(&mut state.cancel_handlers)
        };

        tracing::debug!(
            label = %self.shared.label(),
            handlers = handlers.len(),
            "cancellation requested"
        );
        self.shared.run_cancel_handlers(handlers);
        self
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancel_requested(&self) -> bool {
        self.shared.state.lock().cancel_requested
    }

    /// Returns the current status without blocking.
    #[must_use]
    pub fn status(&self) -> Status {
        self.shared.state.lock().outcome.status()
    }

    /// Returns the outcome if the result settled, without blocking.
    #[must_use]
    pub fn settled(&self) -> Option<Settled<T>> {
        match &self.shared.state.lock().outcome {
            Outcome::Waiting => None,
            Outcome::Done(value) => Some(Settled::Done(Arc::clone(value))),
            Outcome::Failed(failure) => Some(Settled::Failed(Arc::clone(failure))),
            Outcome::Cancelled => Some(Settled::Cancelled),
        }
    }

    /// Blocks until the result settles and returns the terminal status.
    ///
    /// This wait ignores [`Interrupt`](crate::interrupt::Interrupt)s; a
    /// pending interrupt stays pending.
    pub fn wait(&self) -> Status {
        self.shared.wait_until(None).outcome.status()
    }

    /// Blocks until the result settles or `timeout` elapses.
    ///
    /// Returns [`Status::Waiting`] if the timeout elapsed first. A zero
    /// timeout reports the current status immediately.
    pub fn wait_timeout(&self, timeout: Duration) -> Status {
        self.shared.wait_until(deadline_after(timeout)).outcome.status()
    }

    /// Blocks until the result settles or `deadline` passes.
    ///
    /// A deadline in the past reports the current status immediately.
    pub fn wait_deadline(&self, deadline: Instant) -> Status {
        self.shared.wait_until(Some(deadline)).outcome.status()
    }

    /// Returns a future that resolves with the terminal status.
    pub fn wait_async(&self) -> Wait<'_, T> {
        Wait::new(&self.shared)
    }

    /// Returns the failure reason of a failed operation.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidState`](crate::error::ErrorKind::InvalidState)
    /// if the status is not [`Status::Failed`]. This never blocks.
    pub fn failure(&self) -> Result<Arc<io::Error>> {
        match &self.shared.state.lock().outcome {
            Outcome::Failed(failure) => Ok(Arc::clone(failure)),
            other => Err(Error::invalid_state(Status::Failed, other.status())),
        }
    }

    /// Blocks until the result settles and returns the shared value.
    ///
    /// # Errors
    ///
    /// - `Failed` with the stored reason if the operation failed
    /// - `Cancelled` if the operation was cancelled
    pub fn get_shared(&self) -> Result<Arc<T>> {
        self.shared.wait_until(None).outcome.resolve()
    }

    /// Registers `notifier` to run once the result settles.
    ///
    /// If the result already settled, the notifier runs on the calling thread
    /// before this method returns. Otherwise it runs on the thread that
    /// settles the result, after the outcome is visible to every consumer.
    /// Notifiers run in registration order, and a panicking notifier does not
    /// prevent the rest from running.
    pub fn add_notifier<A, N>(&self, notifier: N, attachment: A) -> &Self
    where
        N: Notifier<T, A> + Send + 'static,
        A: Send + 'static,
        T: 'static,
    {
        let pending: PendingNotifier<T> =
            Box::new(move |future: &Self| notifier.notify(future, attachment));
        let pending = {
            let mut state = self.shared.state.lock();
            if state.outcome.is_waiting() {
                state.notifiers.push(pending);
                return self;
            }
            pending
        };
        self.shared.run_isolated("notifier", || pending(self));
        self
    }
}

impl<T: Clone> AsyncResult<T> {
    /// Blocks until the result settles and returns a clone of the value.
    ///
    /// # Errors
    ///
    /// - `Failed` with the stored reason if the operation failed
    /// - `Cancelled` if the operation was cancelled
    pub fn get(&self) -> Result<T> {
        self.get_shared().map(|value| T::clone(&value))
    }
}

impl<T: Send + Sync + 'static> AsyncResult<T> {
    /// Like [`wait`](Self::wait), but gives up if the calling thread is
    /// interrupted.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if the thread's
    /// [`Interrupt`](crate::interrupt::Interrupt) fires while waiting. The
    /// result itself is unaffected.
    pub fn wait_interruptibly(&self) -> Result<Status> {
        let state = self.shared.wait_interruptibly_until(None)?;
        Ok(state.outcome.status())
    }

    /// Like [`wait_timeout`](Self::wait_timeout), but gives up if the calling
    /// thread is interrupted.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if the thread's interrupt fires while waiting.
    pub fn wait_interruptibly_timeout(&self, timeout: Duration) -> Result<Status> {
        let state = self
            .shared
            .wait_interruptibly_until(deadline_after(timeout))?;
        Ok(state.outcome.status())
    }

    /// Like [`get`](Self::get), but gives up if the calling thread is
    /// interrupted.
    ///
    /// # Errors
    ///
    /// - `Interrupted` if the thread's interrupt fires while waiting
    /// - `Failed` with the stored reason if the operation failed
    /// - `Cancelled` if the operation was cancelled
    pub fn get_interruptibly(&self) -> Result<T>
    where
        T: Clone,
    {
        let value = self.shared.wait_interruptibly_until(None)?.outcome.resolve()?;
        Ok(T::clone(&value))
    }
}

#[cfg(test)]
impl<T> AsyncResult<T> {
    pub(crate) fn shared_waker_count(&self) -> usize {
        self.shared.state.lock().wakers.len()
    }
}

impl<T> fmt::Debug for AsyncResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("AsyncResult")
            .field("label", &self.shared.config.label)
            .field("status", &state.outcome.status())
            .field("cancel_requested", &state.cancel_requested)
            .field("notifiers", &state.notifiers.len())
            .finish()
    }
}
