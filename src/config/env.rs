//! Environment variable support for [`FutureConfig`].
//!
//! # Configuration Precedence
//!
//! 1. **Programmatic**: values set via [`Builder`](crate::future::Builder) methods
//! 2. **Environment variables**: values from `IOFUTURE_*` env vars
//! 3. **Defaults**: built-in defaults from [`FutureConfig::default()`]
//!
//! # Supported Environment Variables
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `IOFUTURE_NOTIFIER_PANIC` | `log` / `silent` | `notifier_panic` |
//! | `IOFUTURE_DEFAULT_LABEL` | `String` | `label` |

use std::sync::Arc;

use super::{ConfigError, FutureConfig};

/// Environment variable name for the notifier panic policy.
pub const ENV_NOTIFIER_PANIC: &str = "IOFUTURE_NOTIFIER_PANIC";
/// Environment variable name for the default handle label.
pub const ENV_DEFAULT_LABEL: &str = "IOFUTURE_DEFAULT_LABEL";

/// Apply environment variable overrides to a [`FutureConfig`].
///
/// Only variables that are set in the environment are applied.
/// Returns an error if a variable is set but contains an unparseable value.
pub fn apply_env_overrides(config: &mut FutureConfig) -> Result<(), ConfigError> {
    if let Some(val) = read_env(ENV_NOTIFIER_PANIC) {
        config.notifier_panic = val.parse()?;
    }
    if let Some(val) = read_env(ENV_DEFAULT_LABEL) {
        let trimmed = val.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::InvalidValue {
                var: ENV_DEFAULT_LABEL,
                expected: "a non-empty label",
                value: val,
            });
        }
        config.label = Some(Arc::from(trimmed));
    }
    Ok(())
}

/// Read an environment variable, returning `None` if unset.
fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
