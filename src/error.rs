//! Error types returned by result handles.
//!
//! Error handling follows these principles:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - Every error reaches the immediate caller; nothing is swallowed or logged
//! - The failure reason of the underlying operation is preserved unchanged
//!
//! # Error Kinds
//!
//! - **Failed**: the operation failed; the original [`io::Error`] is attached
//! - **Cancelled**: the operation was cancelled and the producer acknowledged it
//! - **Interrupted**: the *waiting thread* was interrupted; the result itself
//!   is unaffected and may still complete later
//! - **InvalidState**: the caller asked for something the current status cannot
//!   provide (for example the failure of a result that did not fail)

use core::fmt;
use std::io;
use std::sync::Arc;

use crate::types::Status;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The underlying operation failed.
    Failed,
    /// The operation was cancelled.
    Cancelled,
    /// The waiting thread was interrupted before the result settled.
    Interrupted,
    /// The request does not make sense for the current status.
    InvalidState,
}

impl ErrorKind {
    /// Returns true if retrying the same wait may still produce a value.
    ///
    /// Only an interrupted wait leaves the result untouched; every other kind
    /// reflects a terminal status.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed => write!(f, "operation failed"),
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::Interrupted => write!(f, "wait interrupted"),
            Self::InvalidState => write!(f, "invalid state"),
        }
    }
}

/// The main error type for result handle operations.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    failure: Option<Arc<io::Error>>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            failure: None,
        }
    }

    /// Wraps the failure reason of a failed operation.
    #[must_use]
    pub fn failed(failure: Arc<io::Error>) -> Self {
        Self {
            kind: ErrorKind::Failed,
            message: None,
            failure: Some(failure),
        }
    }

    /// Creates a cancellation error.
    #[must_use]
    pub const fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled)
    }

    /// Creates an interruption error.
    #[must_use]
    pub const fn interrupted() -> Self {
        Self::new(ErrorKind::Interrupted)
    }

    /// Creates an invalid-state error describing what was expected.
    #[must_use]
    pub fn invalid_state(expected: Status, actual: Status) -> Self {
        Self::new(ErrorKind::InvalidState)
            .with_message(format!("expected status {expected}, found {actual}"))
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the failure reason of the operation for [`ErrorKind::Failed`].
    #[must_use]
    pub fn failure(&self) -> Option<&Arc<io::Error>> {
        self.failure.as_ref()
    }

    /// Returns true if the operation failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.kind, ErrorKind::Failed)
    }

    /// Returns true if this error represents cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }

    /// Returns true if the wait was interrupted.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self.kind, ErrorKind::Interrupted)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        if let Some(failure) = &self.failure {
            write!(f, ": {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failure.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err.kind {
            ErrorKind::Failed => {
                let kind = err.failure.as_ref().map_or(io::ErrorKind::Other, |f| f.kind());
                Self::new(kind, err)
            }
            ErrorKind::Interrupted => Self::new(io::ErrorKind::Interrupted, err),
            ErrorKind::Cancelled | ErrorKind::InvalidState => Self::new(io::ErrorKind::Other, err),
        }
    }
}

/// A specialized Result type for result handle operations.
pub type Result<T> = core::result::Result<T, Error>;
