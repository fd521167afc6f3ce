//! Shared state behind a result handle.
//!
//! One [`parking_lot::Mutex`] protects everything that changes: the outcome,
//! pending notifiers, the cancellation flag with its handlers, and async task
//! wakers. Blocking waiters sleep on a [`parking_lot::Condvar`] paired with
//! that mutex.
//!
//! The terminal transition happens entirely under the lock. Callbacks are
//! drained under the lock but always run after it is released, so a notifier
//! may freely call back into the handle.

use std::any::Any;
use std::io;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::task::Waker;
use std::time::Instant;

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::config::{FutureConfig, NotifierPanicResponse};
use crate::error::{Error, ErrorKind, Result};
use crate::interrupt::Interrupt;
use crate::types::Status;

use super::{AsyncResult, CancelAck};

/// A notifier bound to its attachment, waiting for the terminal transition.
pub(crate) type PendingNotifier<T> = Box<dyn FnOnce(&AsyncResult<T>) + Send>;

/// A producer callback run on the first cancellation request.
pub(crate) type CancelHandler<T> = Box<dyn FnOnce(CancelAck<T>) + Send>;

/// The status together with whatever the status carries.
pub(crate) enum Outcome<T> {
    Waiting,
    Done(Arc<T>),
    Failed(Arc<io::Error>),
    Cancelled,
}

impl<T> Outcome<T> {
    pub(crate) const fn status(&self) -> Status {
        match self {
            Self::Waiting => Status::Waiting,
            Self::Done(_) => Status::Done,
            Self::Failed(_) => Status::Failed,
            Self::Cancelled => Status::Cancelled,
        }
    }

    pub(crate) const fn is_waiting(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Resolves a settled outcome the way `get` reports it.
    pub(crate) fn resolve(&self) -> Result<Arc<T>> {
        match self {
            Self::Done(value) => Ok(Arc::clone(value)),
            Self::Failed(failure) => Err(Error::failed(Arc::clone(failure))),
            Self::Cancelled => Err(Error::cancelled()),
            Self::Waiting => {
                Err(Error::new(ErrorKind::InvalidState).with_message("result has not settled"))
            }
        }
    }
}

/// Slot storage for async wakers that reuses freed slots.
#[derive(Debug, Default)]
pub(crate) struct WakerSlab {
    entries: Vec<Option<Waker>>,
    free_slots: Vec<usize>,
}

impl WakerSlab {
    pub(crate) fn insert(&mut self, waker: Waker) -> usize {
        if let Some(index) = self.free_slots.pop() {
            self.entries[index] = Some(waker);
            index
        } else {
            self.entries.push(Some(waker));
            self.entries.len() - 1
        }
    }

    /// Replaces the waker in `index` unless it would wake the same task.
    pub(crate) fn update(&mut self, index: usize, waker: &Waker) {
        if let Some(slot) = self.entries.get_mut(index) {
            match slot {
                Some(existing) if existing.will_wake(waker) => {}
                _ => *slot = Some(waker.clone()),
            }
        }
    }

    pub(crate) fn remove(&mut self, index: usize) {
        if let Some(slot) = self.entries.get_mut(index) {
            if slot.take().is_some() {
                self.free_slots.push(index);
            }
        }
    }

    pub(crate) fn drain(&mut self) -> Vec<Waker> {
        self.free_slots.clear();
        mem::take(&mut self.entries).into_iter().flatten().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }
}

/// Mutable fields, all guarded by [`Shared::state`].
pub(crate) struct State<T> {
    pub(crate) outcome: Outcome<T>,
    pub(crate) notifiers: Vec<PendingNotifier<T>>,
    pub(crate) cancel_requested: bool,
    pub(crate) cancel_handlers: Vec<CancelHandler<T>>,
    pub(crate) wakers: WakerSlab,
}

impl<T> State<T> {
    const fn new(outcome: Outcome<T>) -> Self {
        Self {
            outcome,
            notifiers: Vec::new(),
            cancel_requested: false,
            cancel_handlers: Vec::new(),
            wakers: WakerSlab {
                entries: Vec::new(),
                free_slots: Vec::new(),
            },
        }
    }
}

/// State shared by the completer and every consumer handle.
pub(crate) struct Shared<T> {
    pub(crate) state: Mutex<State<T>>,
    settled: Condvar,
    pub(crate) config: FutureConfig,
}

impl<T> Shared<T> {
    pub(crate) fn new(config: FutureConfig) -> Self {
        Self::with_outcome(config, Outcome::Waiting)
    }

    pub(crate) fn with_outcome(mut config: FutureConfig, outcome: Outcome<T>) -> Self {
        config.normalize();
        Self {
            state: Mutex::new(State::new(outcome)),
            settled: Condvar::new(),
            config,
        }
    }

    pub(crate) fn label(&self) -> &str {
        self.config.label_or_default()
    }

    /// Performs the terminal transition.
    ///
    /// Returns `false` without touching anything if the result already
    /// settled; the rejected outcome is dropped.
    pub(crate) fn settle(self: &Arc<Self>, outcome: Outcome<T>) -> bool {
        let attempted = outcome.status();
        match self.commit(|_| outcome) {
            Ok(()) => true,
            Err(current) => {
                tracing::debug!(
                    label = %self.label(),
                    attempted = %attempted,
                    current = %current,
                    "ignoring repeated terminal transition"
                );
                false
            }
        }
    }

    /// Settles a result whose producer went away.
    ///
    /// The outcome is chosen under the same lock that writes it: a pending
    /// cancellation request turns into `Cancelled`, anything else fails with
    /// [`io::ErrorKind::BrokenPipe`].
    pub(crate) fn settle_abandoned(self: &Arc<Self>) -> bool {
        let mut cancel_requested = false;
        let settled = self
            .commit(|state| {
                cancel_requested = state.cancel_requested;
                if cancel_requested {
                    Outcome::Cancelled
                } else {
                    Outcome::Failed(Arc::new(io::Error::new(
                        io::ErrorKind::BrokenPipe,
                        "operation abandoned before completion",
                    )))
                }
            })
            .is_ok();
        if settled {
            tracing::debug!(
                label = %self.label(),
                cancel_requested,
                "completer dropped before settling"
            );
        }
        settled
    }

    /// Writes the outcome picked by `decide` if the result is still waiting,
    /// then releases waiters and runs notifiers outside the lock.
    ///
    /// Returns the current status if the result had already settled.
    fn commit(
        self: &Arc<Self>,
        decide: impl FnOnce(&State<T>) -> Outcome<T>,
    ) -> std::result::Result<(), Status> {
        let (status, notifiers, wakers, stale_handlers) = {
            let mut state = self.state.lock();
            if !state.outcome.is_waiting() {
                return Err(state.outcome.status());
            }
            let outcome = decide(&*state);
            let status = outcome.status();
            state.outcome = outcome;
            let notifiers = mem::take(&mut state.notifiers);
            let wakers = state.wakers.drain();
            let stale_handlers = mem::take(&mut state.cancel_handlers);
            self.settled.notify_all();
            (status, notifiers, wakers, stale_handlers)
        };
        drop(stale_handlers);

        tracing::trace!(
            label = %self.label(),
            status = %status,
            notifiers = notifiers.len(),
            wakers = wakers.len(),
            "result settled"
        );

        for waker in wakers {
            waker.wake();
        }

        if !notifiers.is_empty() {
            let handle = AsyncResult::from_shared(Arc::clone(self));
            for notifier in notifiers {
                self.run_isolated("notifier", || notifier(&handle));
            }
        }
        Ok(())
    }

    /// Runs cancel handlers, handing each one the right to acknowledge.
    pub(crate) fn run_cancel_handlers(self: &Arc<Self>, handlers: Vec<CancelHandler<T>>) {
        for handler in handlers {
            let ack = CancelAck::new(Arc::clone(self));
            self.run_isolated("cancel handler", || handler(ack));
        }
    }

    /// Blocks until the result settles or `deadline` passes.
    ///
    /// A deadline that already passed returns immediately.
    pub(crate) fn wait_until(&self, deadline: Option<Instant>) -> MutexGuard<'_, State<T>> {
        let mut state = self.state.lock();
        while state.outcome.is_waiting() {
            match deadline {
                None => self.settled.wait(&mut state),
                Some(deadline) => {
                    if self.settled.wait_until(&mut state, deadline).timed_out() {
                        break;
                    }
                }
            }
        }
        state
    }

    /// Like [`Self::wait_until`], but gives up when the calling thread is
    /// interrupted.
    ///
    /// A result that already settled is returned without looking at the
    /// interrupt flag. Reporting an interrupt clears the flag.
    pub(crate) fn wait_interruptibly_until(
        self: &Arc<Self>,
        deadline: Option<Instant>,
    ) -> Result<MutexGuard<'_, State<T>>>
    where
        T: Send + Sync + 'static,
    {
        let mut state = self.state.lock();
        if !state.outcome.is_waiting() {
            return Ok(state);
        }

        let interrupt = Interrupt::current();
        let shared = Arc::clone(self);
        let _hook = interrupt.register(Arc::new(move || {
            let _state = shared.state.lock();
            shared.settled.notify_all();
        }));

        loop {
            if interrupt.clear() {
                return Err(Error::interrupted());
            }
            match deadline {
                None => self.settled.wait(&mut state),
                Some(deadline) => {
                    if self.settled.wait_until(&mut state, deadline).timed_out() {
                        return Ok(state);
                    }
                }
            }
            if !state.outcome.is_waiting() {
                return Ok(state);
            }
        }
    }

    /// Runs a user callback, containing any panic it raises.
    pub(crate) fn run_isolated(&self, what: &'static str, f: impl FnOnce()) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
            match self.config.notifier_panic {
                NotifierPanicResponse::Log => tracing::warn!(
                    label = %self.label(),
                    callback = what,
                    panic = %panic_message(payload.as_ref()),
                    "callback panicked; remaining callbacks still run"
                ),
                NotifierPanicResponse::Silent => {}
            }
        }
    }
}

/// Converts a deadline relative to now, or `None` if it cannot be represented.
pub(crate) fn deadline_after(timeout: std::time::Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
