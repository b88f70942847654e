//! Batch lifecycle state.

use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::models::SiteResult;

/// Lifecycle of the orchestrator.
///
/// `Idle -> Running -> {Completed | Cancelled | Failed}`; every terminal
/// state may start a new run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl BatchState {
    pub fn is_running(&self) -> bool {
        matches!(self, BatchState::Running)
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BatchState::Idle => "idle",
            BatchState::Running => "running",
            BatchState::Completed => "completed",
            BatchState::Cancelled => "cancelled",
            BatchState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Which operator actions are currently available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordances {
    pub start_enabled: bool,
    pub stop_enabled: bool,
}

impl From<BatchState> for Affordances {
    fn from(state: BatchState) -> Self {
        Self {
            start_enabled: !state.is_running(),
            stop_enabled: state.is_running(),
        }
    }
}

/// Everything one run owns. Dropped when the run ends, whatever the outcome.
#[derive(Debug)]
pub(crate) struct BatchRunState {
    pub index: usize,
    pub cancel: CancellationToken,
    pub results: Vec<SiteResult>,
}

impl BatchRunState {
    pub fn new(cancel: CancellationToken, capacity: usize) -> Self {
        Self {
            index: 0,
            cancel,
            results: Vec::with_capacity(capacity),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
