//! Per-thread interruption signal for interruptible waits.
//!
//! Every thread owns one [`Interrupt`], obtained with [`Interrupt::current`].
//! The handle can be cloned and sent to other threads; calling
//! [`Interrupt::interrupt`] from anywhere sets the flag and promptly wakes the
//! owning thread if it is blocked in an interruptible wait such as
//! [`AsyncResult::wait_interruptibly`](crate::future::AsyncResult::wait_interruptibly).
//!
//! An interruptible wait that observes the flag clears it and reports
//! [`ErrorKind::Interrupted`](crate::error::ErrorKind::Interrupted). Plain
//! waits never look at the flag, so a pending interrupt stays set for the next
//! interruptible operation.
//!
//! # Wakeup protocol
//!
//! A blocked waiter registers a wake hook before it re-checks the flag. The
//! interrupting side stores the flag first and then runs the hook, which
//! acquires the waiter's lock before signalling its condition variable. The
//! waiter holds that lock from the flag check until the condition variable
//! releases it, so the signal cannot fall between the check and the wait.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type WakeHook = Arc<dyn Fn() + Send + Sync>;

struct Inner {
    interrupted: AtomicBool,
    hook: Mutex<Option<WakeHook>>,
}

/// Interruption flag of a single thread.
#[derive(Clone)]
pub struct Interrupt {
    inner: Arc<Inner>,
}

thread_local! {
    static CURRENT: Interrupt = Interrupt::new();
}

impl Interrupt {
    fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                interrupted: AtomicBool::new(false),
                hook: Mutex::new(None),
            }),
        }
    }

    /// Returns the interrupt handle of the calling thread.
    #[must_use]
    pub fn current() -> Self {
        CURRENT.with(Clone::clone)
    }

    /// Interrupts the owning thread.
    ///
    /// Sets the flag and wakes the thread if it is blocked in an
    /// interruptible wait. Interrupting twice before the flag is consumed has
    /// the same effect as interrupting once.
    pub fn interrupt(&self) {
        self.inner.interrupted.store(true, Ordering::SeqCst);
        let hook = self.inner.hook.lock().clone();
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Returns true if the flag is set, without clearing it.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.inner.interrupted.load(Ordering::SeqCst)
    }

    /// Clears the flag, returning whether it was set.
    pub fn clear(&self) -> bool {
        self.inner.interrupted.swap(false, Ordering::SeqCst)
    }

    /// Returns true if both handles refer to the same thread's flag.
    #[must_use]
    pub fn same_thread(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Installs a wake hook for the duration of one blocking wait.
    ///
    /// The hook is removed when the returned guard is dropped.
    pub(crate) fn register(&self, hook: WakeHook) -> HookGuard<'_> {
        *self.inner.hook.lock() = Some(hook);
        HookGuard { interrupt: self }
    }
}

impl fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interrupt")
            .field("interrupted", &self.is_interrupted())
            .finish()
    }
}

/// Removes the wake hook on drop.
pub(crate) struct HookGuard<'a> {
    interrupt: &'a Interrupt,
}

impl Drop for HookGuard<'_> {
    fn drop(&mut self) {
        self.interrupt.inner.hook.lock().take();
    }
}
