//! Property-based tests for result handle invariants.
//!
//! # State Machine Invariants
//! - Single assignment: only the first terminal transition takes effect
//! - Status is monotone: once terminal, it never changes
//! - `get` agrees with `status` for every terminal status
//! - Cancellation requests never change the status by themselves
//!
//! # Notifier Invariants
//! - Every notifier runs exactly once, whether registered before or after settling
//! - Notifiers registered before settling run in registration order

#[macro_use]
mod common;

use common::*;
use iofuture::error::ErrorKind;
use iofuture::future::{pair, AsyncResult};
use iofuture::types::Status;
use parking_lot::Mutex;
use proptest::prelude::*;
use std::io;
use std::sync::Arc;

// ============================================================================
// Strategies
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Complete(u16),
    Fail,
    AcknowledgeCancelled,
    Cancel,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u16>().prop_map(Op::Complete),
        Just(Op::Fail),
        Just(Op::AcknowledgeCancelled),
        Just(Op::Cancel),
    ]
}

fn expected_status(op: &Op) -> Option<Status> {
    match op {
        Op::Complete(_) => Some(Status::Done),
        Op::Fail => Some(Status::Failed),
        Op::AcknowledgeCancelled => Some(Status::Cancelled),
        Op::Cancel => None,
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(test_proptest_config(256))]

    #[test]
    fn first_transition_wins(ops in prop::collection::vec(op(), 0..12)) {
        init_test_logging();
        let (completer, result) = pair::<u16>();
        let mut expected: Option<(Status, Option<u16>)> = None;

        for op in &ops {
            let accepted = match op {
                Op::Complete(v) => completer.complete(*v),
                Op::Fail => completer.fail(io::ErrorKind::Other),
                Op::AcknowledgeCancelled => completer.acknowledge_cancelled(),
                Op::Cancel => {
                    let before = result.status();
                    result.cancel();
                    prop_assert_eq!(result.status(), before);
                    continue;
                }
            };
            prop_assert_eq!(accepted, expected.is_none());
            if expected.is_none() {
                let value = match op {
                    Op::Complete(v) => Some(*v),
                    _ => None,
                };
                expected = expected_status(op).map(|s| (s, value));
            }
            let (status, _) = expected.expect("a transition was attempted");
            prop_assert_eq!(result.status(), status);
        }

        match expected {
            None => {
                prop_assert_eq!(result.status(), Status::Waiting);
            }
            Some((Status::Done, value)) => {
                prop_assert_eq!(result.get().ok(), value);
            }
            Some((Status::Failed, _)) => {
                prop_assert_eq!(result.get().unwrap_err().kind(), ErrorKind::Failed);
                prop_assert!(result.failure().is_ok());
            }
            Some((Status::Cancelled, _)) => {
                prop_assert_eq!(result.get().unwrap_err().kind(), ErrorKind::Cancelled);
            }
            Some((Status::Waiting, _)) => unreachable!("waiting is never recorded as terminal"),
        }
    }

    #[test]
    fn notifiers_run_exactly_once(before in 0usize..8, after in 0usize..8, settle in op()) {
        init_test_logging();
        let (completer, result) = pair::<u16>();
        let log = Arc::new(Mutex::new(Vec::new()));

        let register = |index: usize| {
            let log = Arc::clone(&log);
            result.add_notifier(
                move |future: &AsyncResult<u16>, tag: usize| {
                    log.lock().push((tag, future.status()));
                },
                index,
            );
        };

        for index in 0..before {
            register(index);
        }
        let terminal = match settle {
            Op::Complete(v) => { completer.complete(v); Status::Done }
            Op::Fail => { completer.fail(io::ErrorKind::Other); Status::Failed }
            Op::AcknowledgeCancelled | Op::Cancel => {
                completer.acknowledge_cancelled();
                Status::Cancelled
            }
        };
        prop_assert_eq!(log.lock().len(), before);
        for index in before..before + after {
            register(index);
        }

        let log = log.lock();
        let tags: Vec<usize> = log.iter().map(|(tag, _)| *tag).collect();
        prop_assert_eq!(tags, (0..before + after).collect::<Vec<_>>());
        prop_assert!(log.iter().all(|(_, status)| *status == terminal));
    }
}
