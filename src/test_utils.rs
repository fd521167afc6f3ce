//! Test utilities for iofuture.
//!
//! This module provides shared helpers for unit tests:
//! - Consistent tracing-based logging initialization
//! - Phase/section macros for readable test output
//! - A lock serializing tests that mutate environment variables

use std::sync::{Mutex, Once};
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .try_init();
    });
}

/// Acquire the global environment lock for tests that mutate env vars.
pub fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log a section within a test phase.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        tracing::debug!(section = %$name, "--- {} ---", $name);
    };
}

/// Log test completion with summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info!(
            test = %$name,
            $($key = %$value,)*
            "test completed successfully: {}",
            $name
        );
    };
}

/// Log before assertions for context.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            "Asserting: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}

/// Assert that a handle settled with a specific value.
#[macro_export]
macro_rules! assert_settled_done {
    ($result:expr, $expected:expr) => {
        match $result.settled() {
            Some($crate::future::Settled::Done(v)) => assert_eq!(*v, $expected),
            other => unreachable!("expected Settled::Done({:?}), got {:?}", $expected, other),
        }
    };
}

/// Assert that a handle settled as cancelled.
#[macro_export]
macro_rules! assert_settled_cancelled {
    ($result:expr) => {
        match $result.settled() {
            Some($crate::future::Settled::Cancelled) => {}
            other => unreachable!("expected Settled::Cancelled, got {:?}", other),
        }
    };
}

/// Assert that a handle settled as failed.
#[macro_export]
macro_rules! assert_settled_failed {
    ($result:expr) => {
        match $result.settled() {
            Some($crate::future::Settled::Failed(_)) => {}
            other => unreachable!("expected Settled::Failed, got {:?}", other),
        }
    };
}
