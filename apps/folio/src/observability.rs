//! Failure sink: where recoverable failures are reported.
//!
//! Fetch failures are never shown to the visitor, and rendering failures are
//! shown as a single notification; both are recorded here exactly once.

use serde::Serialize;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Fetch,
    Parse,
    Preview,
    Capability,
    Render,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub stage: FailureStage,
    pub message: String,
}

impl Failure {
    pub fn new(stage: FailureStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

pub trait FailureSink: Send + Sync {
    fn record(&self, failure: &Failure);
}

/// Default sink: one structured `error` event per failure.
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn record(&self, failure: &Failure) {
        error!(stage = ?failure.stage, message = %failure.message, "Recorded failure");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::{Failure, FailureSink, FailureStage};

    #[derive(Default)]
    pub struct RecordingSink {
        pub failures: Mutex<Vec<Failure>>,
    }

    impl RecordingSink {
        pub fn count(&self) -> usize {
            self.failures.lock().unwrap().len()
        }

        pub fn stages(&self) -> Vec<FailureStage> {
            self.failures.lock().unwrap().iter().map(|f| f.stage).collect()
        }
    }

    impl FailureSink for RecordingSink {
        fn record(&self, failure: &Failure) {
            self.failures.lock().unwrap().push(failure.clone());
        }
    }
}
