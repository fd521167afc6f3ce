//! Completion callbacks.
//!
//! A [`Notifier`] is invoked exactly once per registration, after the result
//! settles. It receives the handle it was registered on together with the
//! attachment supplied at registration, so one notifier type can serve many
//! operations.
//!
//! [`HandlingNotifier`] is a convenience for notifiers that want to react
//! differently to each terminal status:
//!
//! ```text
//!   settle ──► Handling<H>::notify
//!                 │
//!                 ├─ Done(value)     ──► handle_done(&value, attachment)
//!                 ├─ Failed(reason)  ──► handle_failed(&reason, attachment)
//!                 └─ Cancelled       ──► handle_cancelled(attachment)
//! ```

use std::io;

use super::handle::{AsyncResult, Settled};

/// Callback run once a result settles.
///
/// Implemented for every `FnOnce(&AsyncResult<T>, A)`, so closures work
/// directly:
///
/// ```
/// use iofuture::future::{pair, AsyncResult};
///
/// let (completer, result) = pair::<u32>();
/// result.add_notifier(
///     |future: &AsyncResult<u32>, tag: &'static str| {
///         println!("{tag}: {}", future.status());
///     },
///     "lookup",
/// );
/// completer.complete(7);
/// ```
pub trait Notifier<T, A> {
    /// Reacts to the terminal transition of `future`.
    fn notify(self, future: &AsyncResult<T>, attachment: A);
}

impl<T, A, F> Notifier<T, A> for F
where
    F: FnOnce(&AsyncResult<T>, A),
{
    fn notify(self, future: &AsyncResult<T>, attachment: A) {
        self(future, attachment);
    }
}

/// A notifier that dispatches on the terminal status.
///
/// Every method defaults to doing nothing; override the ones you care about
/// and register the value wrapped in [`Handling`].
pub trait HandlingNotifier<T, A>: Sized {
    /// Called when the operation produced `value`.
    fn handle_done(self, value: &T, attachment: A) {
        let _ = (value, attachment);
    }

    /// Called when the operation failed with `failure`.
    fn handle_failed(self, failure: &io::Error, attachment: A) {
        let _ = (failure, attachment);
    }

    /// Called when the operation was cancelled.
    fn handle_cancelled(self, attachment: A) {
        let _ = attachment;
    }
}

/// Adapts a [`HandlingNotifier`] into a [`Notifier`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Handling<H>(pub H);

impl<T, A, H> Notifier<T, A> for Handling<H>
where
    H: HandlingNotifier<T, A>,
{
    fn notify(self, future: &AsyncResult<T>, attachment: A) {
        match future.settled() {
            Some(Settled::Done(value)) => self.0.handle_done(&value, attachment),
            Some(Settled::Failed(failure)) => self.0.handle_failed(&failure, attachment),
            Some(Settled::Cancelled) => self.0.handle_cancelled(attachment),
            None => unreachable!("notifier invoked before the result settled"),
        }
    }
}
