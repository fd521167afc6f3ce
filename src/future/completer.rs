//! The producer side of a result: [`Completer`].

use std::fmt;
use std::io;
use std::sync::Arc;

use super::handle::AsyncResult;
use super::state::{Outcome, Shared};

/// Settles exactly one [`AsyncResult`].
///
/// The first call to [`complete`](Self::complete), [`fail`](Self::fail) or
/// [`acknowledge_cancelled`](Self::acknowledge_cancelled) decides the
/// outcome; later calls are ignored and return `false`.
///
/// # Dropping
///
/// Dropping a completer that never settled its result settles it anyway, so
/// consumers never block forever on an abandoned operation:
///
/// - if cancellation was requested, the result becomes `Cancelled`
/// - otherwise it fails with [`io::ErrorKind::BrokenPipe`]
pub struct Completer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Completer<T> {
    pub(crate) const fn new(shared: Arc<Shared<T>>) -> Self {
        Self { shared }
    }

    /// Settles the result with `value`.
    ///
    /// Returns `false` if the result had already settled.
    pub fn complete(&self, value: T) -> bool {
        self.shared.settle(Outcome::Done(Arc::new(value)))
    }

    /// Settles the result as failed.
    ///
    /// Returns `false` if the result had already settled.
    pub fn fail(&self, failure: impl Into<io::Error>) -> bool {
        self.shared.settle(Outcome::Failed(Arc::new(failure.into())))
    }

    /// Settles the result as cancelled.
    ///
    /// Usually called in response to [`AsyncResult::cancel`], but a producer
    /// may also cancel on its own. Returns `false` if the result had already
    /// settled.
    pub fn acknowledge_cancelled(&self) -> bool {
        self.shared.settle(Outcome::Cancelled)
    }

    /// Returns true once any consumer requested cancellation.
    #[must_use]
    pub fn is_cancel_requested(&self) -> bool {
        self.shared.state.lock().cancel_requested
    }

    /// Returns true if the result has settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self.shared.state.lock().outcome.is_waiting()
    }

    /// Registers a callback for the first cancellation request.
    ///
    /// The handler receives a [`CancelAck`] it may use to honor the request.
    /// If cancellation was already requested and the result is still
    /// waiting, `handler` runs immediately on this thread. Handlers that
    /// never ran are dropped when the result settles.
    ///
    /// ```
    /// use iofuture::future::pair;
    /// use iofuture::types::Status;
    ///
    /// let (completer, result) = pair::<u32>();
    /// completer.on_cancel(|ack| {
    ///     ack.acknowledge_cancelled();
    /// });
    /// result.cancel();
    /// assert_eq!(result.status(), Status::Cancelled);
    /// ```
    pub fn on_cancel<F>(&self, handler: F) -> &Self
    where
        F: FnOnce(CancelAck<T>) + Send + 'static,
    {
        {
            let mut state = self.shared.state.lock();
            if !state.outcome.is_waiting() {
                return self;
            }
            if !state.cancel_requested {
                state.cancel_handlers.push(Box::new(handler));
                return self;
            }
        }
        self.shared.run_cancel_handlers(vec![Box::new(handler)]);
        self
    }

    /// Returns a consumer handle for the result this completer settles.
    #[must_use]
    pub fn handle(&self) -> AsyncResult<T> {
        AsyncResult::from_shared(Arc::clone(&self.shared))
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        self.shared.settle_abandoned();
    }
}

/// Permission to acknowledge a cancellation request, handed to
/// [`Completer::on_cancel`] handlers.
///
/// Holding an acknowledgement does not keep the [`Completer`] alive, so a
/// handler never stops the drop rule from settling an abandoned result.
pub struct CancelAck<T> {
    shared: Arc<Shared<T>>,
}

impl<T> CancelAck<T> {
    pub(crate) const fn new(shared: Arc<Shared<T>>) -> Self {
        Self { shared }
    }

    /// Settles the result as cancelled.
    ///
    /// Returns `false` if the result had already settled.
    pub fn acknowledge_cancelled(self) -> bool {
        self.shared.settle(Outcome::Cancelled)
    }
}

impl<T> fmt::Debug for CancelAck<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelAck")
            .field("label", &self.shared.config.label)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Debug for Completer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Completer")
            .field("label", &self.shared.config.label)
            .field("status", &state.outcome.status())
            .field("cancel_requested", &state.cancel_requested)
            .finish()
    }
}
