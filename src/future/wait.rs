//! Async waiting on a result handle.
//!
//! # Cancel Safety
//!
//! - `wait_async().await`: Cancel-safe. Dropping the future removes its waker
//!   and has no effect on the result.
//! - Polling after completion keeps returning the terminal status.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::types::Status;

use super::state::Shared;

/// Future returned by [`AsyncResult::wait_async`](super::AsyncResult::wait_async).
///
/// Resolves with the terminal status once the result settles.
#[must_use = "futures do nothing unless polled"]
pub struct Wait<'a, T> {
    shared: &'a Shared<T>,
    waker_index: Option<usize>,
}

impl<'a, T> Wait<'a, T> {
    pub(crate) const fn new(shared: &'a Shared<T>) -> Self {
        Self {
            shared,
            waker_index: None,
        }
    }
}

impl<T> Future for Wait<'_, T> {
    type Output = Status;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Status> {
        let this = self.get_mut();
        let mut state = this.shared.state.lock();
        if !state.outcome.is_waiting() {
            // Settling drained the slab, so our slot is already gone.
            this.waker_index = None;
            return Poll::Ready(state.outcome.status());
        }

        match this.waker_index {
            Some(index) => state.wakers.update(index, cx.waker()),
            None => this.waker_index = Some(state.wakers.insert(cx.waker().clone())),
        }
        Poll::Pending
    }
}

impl<T> Drop for Wait<'_, T> {
    fn drop(&mut self) {
        if let Some(index) = self.waker_index.take() {
            self.shared.state.lock().wakers.remove(index);
        }
    }
}

impl<T> std::fmt::Debug for Wait<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wait")
            .field("registered", &self.waker_index.is_some())
            .finish()
    }
}
