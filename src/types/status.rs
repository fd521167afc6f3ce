//! Status of an asynchronous result.
//!
//! A result starts out [`Status::Waiting`] and moves to exactly one of the
//! three terminal states. The terminal states are absorbing: once reached, the
//! status never changes again.
//!
//! ```text
//!                 ┌──────► Done
//!                 │
//!   Waiting ──────┼──────► Failed
//!                 │
//!                 └──────► Cancelled
//! ```

use core::fmt;

/// The current status of an asynchronous operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The operation is still in progress.
    Waiting,
    /// The operation completed successfully and produced a value.
    Done,
    /// The operation was cancelled and the producer acknowledged it.
    Cancelled,
    /// The operation did not succeed.
    Failed,
}

impl Status {
    /// Returns true for `Done`, `Cancelled` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Waiting)
    }

    /// Returns true if the operation is still in progress.
    #[must_use]
    pub const fn is_waiting(self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns the lowercase name used in logs and config values.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
