// Progress snapshots published by the engine

use serde::{Deserialize, Serialize};

/// Run state carried by every snapshot; everything but `Running` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunState::Running)
    }
}

/// Immutable snapshot of a run. New snapshots replace old ones; consumers may keep only the latest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProgress {
    pub files_completed: u64,
    pub files_target: u64,
    pub total_bytes_written: u64,
    pub total_bytes_goal: u64,
    pub elapsed_seconds: f64,
    /// `None` until a write rate can be measured.
    pub estimated_remaining_seconds: Option<f64>,
    pub current_free_space_bytes: u64,
    pub state: RunState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunProgress {
    /// Share of the byte goal written so far, in percent. An empty goal counts as done.
    pub fn percent_complete(&self) -> f64 {
        if self.total_bytes_goal == 0 {
            return 100.0;
        }
        (self.total_bytes_written as f64 / self.total_bytes_goal as f64 * 100.0).clamp(0.0, 100.0)
    }
}
