#![allow(dead_code)]

pub use cvskeeper_test_utils::builders;
pub use cvskeeper_test_utils::fake_cvs;
pub use cvskeeper_test_utils::init_tracing;

use cvskeeper::engine::SyncReport;
use cvskeeper::handler::CallbackOutcome;

/// Unwrap a completed callback, panicking with the outcome otherwise.
pub fn completed(outcome: CallbackOutcome) -> SyncReport {
    match outcome {
        CallbackOutcome::Completed(report) => report,
        other => panic!("expected Completed, got {other:?}"),
    }
}
