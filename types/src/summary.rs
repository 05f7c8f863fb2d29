use std::fmt;
use std::time::Duration;

use crate::matching::ItemId;

/// A dispatch unit that did not complete successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    pub id: ItemId,
    pub reason: String,
}

impl DispatchFailure {
    #[must_use]
    pub fn new(id: ItemId, reason: impl Into<String>) -> Self {
        Self {
            id,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.reason)
    }
}

/// Outcome of one completed pipeline pass.
///
/// Only produced when the fetch stage succeeded. `attempted` always equals
/// `succeeded + failed`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Records returned by the collection endpoint.
    pub records: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<DispatchFailure>,
    /// Wall-clock time from the start of the fetch until the last dispatch returned.
    pub elapsed: Duration,
}

impl RunSummary {
    #[must_use]
    pub fn new(
        records: usize,
        attempted: usize,
        failures: Vec<DispatchFailure>,
        elapsed: Duration,
    ) -> Self {
        let failed = failures.len();
        Self {
            records,
            attempted,
            succeeded: attempted.saturating_sub(failed),
            failed,
            failures,
            elapsed,
        }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}
