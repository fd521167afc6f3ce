//! Per-handle configuration.
//!
//! These types hold the values that shape how a result handle reports and
//! isolates user callbacks. In most cases you should use
//! [`Builder`](crate::future::Builder) rather than constructing a
//! [`FutureConfig`] directly.
//!
//! # Defaults
//!
//! | Field | Default |
//! |-------|---------|
//! | `label` | `None` |
//! | `notifier_panic` | [`NotifierPanicResponse::Log`] |
//!
//! Environment overrides are described in [`env`].

pub mod env;

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;

pub use env::{apply_env_overrides, ENV_DEFAULT_LABEL, ENV_NOTIFIER_PANIC};

/// Error produced while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("invalid value for {var}: expected {expected}, got {value:?}")]
    InvalidValue {
        /// Name of the offending variable.
        var: &'static str,
        /// Human-readable description of accepted values.
        expected: &'static str,
        /// The raw value that was rejected.
        value: String,
    },
}

/// Response policy when a notifier or cancel handler panics.
///
/// The panic is always contained: remaining callbacks still run and the
/// handle's state is unaffected. The policy only controls reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifierPanicResponse {
    /// Report the panic with `tracing::warn!`.
    #[default]
    Log,
    /// Drop the panic without reporting it.
    Silent,
}

impl NotifierPanicResponse {
    /// Returns the config spelling of this policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Silent => "silent",
        }
    }
}

impl fmt::Display for NotifierPanicResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotifierPanicResponse {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "log" | "warn" => Ok(Self::Log),
            "silent" | "off" => Ok(Self::Silent),
            _ => Err(ConfigError::InvalidValue {
                var: ENV_NOTIFIER_PANIC,
                expected: "log or silent",
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration carried by every result handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FutureConfig {
    /// Label attached to log events emitted for this handle.
    pub label: Option<Arc<str>>,
    /// What to do when a notifier or cancel handler panics.
    pub notifier_panic: NotifierPanicResponse,
}

impl FutureConfig {
    /// Builds a config from defaults plus environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Normalize configuration values.
    ///
    /// An empty label is treated as no label.
    pub fn normalize(&mut self) {
        if self.label.as_deref().is_some_and(|l| l.trim().is_empty()) {
            self.label = None;
        }
    }

    /// Returns the label, or `"-"` when none is set.
    #[must_use]
    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or("-")
    }
}
