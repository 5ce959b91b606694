//! Step and run outcomes.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::context::{Outputs, StepPath};
use crate::error::{OrgflowError, Result};

/// Terminal state of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Gate evaluated false, `--skip` named the task, or the run was
    /// cancelled before a lone task started.
    Skipped,
    Succeeded,
    Failed,
}

impl StepStatus {
    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Skipped => '⊘',
            StepStatus::Succeeded => '✓',
            StepStatus::Failed => '✗',
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Skipped => "skipped",
            StepStatus::Succeeded => "succeeded",
            StepStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub path: StepPath,
    pub task: String,
    pub status: StepStatus,
    /// Captured outputs; empty unless the step succeeded.
    pub outputs: Outputs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Why the step was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl StepRecord {
    /// Create a skipped record.
    pub fn skipped(path: StepPath, task: &str, reason: impl Into<String>) -> Self {
        Self {
            path,
            task: task.to_string(),
            status: StepStatus::Skipped,
            outputs: Outputs::new(),
            error: None,
            reason: Some(reason.into()),
            duration: Duration::ZERO,
        }
    }

    /// Create a success record.
    pub fn succeeded(path: StepPath, task: &str, outputs: Outputs, duration: Duration) -> Self {
        Self {
            path,
            task: task.to_string(),
            status: StepStatus::Succeeded,
            outputs,
            error: None,
            reason: None,
            duration,
        }
    }

    /// Create a failure record.
    pub fn failed(path: StepPath, task: &str, error: &OrgflowError, duration: Duration) -> Self {
        Self {
            path,
            task: task.to_string(),
            status: StepStatus::Failed,
            outputs: Outputs::new(),
            error: Some(error.to_string()),
            reason: None,
            duration,
        }
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every step succeeded or was skipped.
    Succeeded,
    /// At least one step failed with `ignore_failure` set; the run went on.
    CompletedWithErrors,
    /// A failure that was not tolerated halted the run.
    Aborted,
    /// Cancelled between steps.
    Cancelled,
}

impl RunStatus {
    /// Whether every step that ran succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Succeeded)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Succeeded => "succeeded",
            RunStatus::CompletedWithErrors => "completed with errors",
            RunStatus::Aborted => "aborted",
            RunStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Result of running a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    /// Flow (or task) name.
    pub flow: String,
    pub status: RunStatus,
    /// One record per step that reached a terminal state, in order.
    pub steps: Vec<StepRecord>,
    pub started_at: DateTime<Utc>,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl RunResult {
    /// Records of failed steps.
    pub fn failed(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps
            .iter()
            .filter(|r| r.status == StepStatus::Failed)
    }

    /// Record of the step at `path`.
    pub fn record(&self, path: &StepPath) -> Option<&StepRecord> {
        self.steps.iter().find(|r| &r.path == path)
    }

    /// Tasks that actually ran, in order.
    pub fn executed_tasks(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|r| r.status != StepStatus::Skipped)
            .map(|r| r.task.as_str())
            .collect()
    }

    /// Turn an aborted run into `RunAborted`; anything else passes through.
    pub fn into_result(self) -> Result<Self> {
        if self.status != RunStatus::Aborted {
            return Ok(self);
        }

        let (step, reason) = self
            .failed()
            .last()
            .map(|r| (r.path.to_string(), r.error.clone().unwrap_or_default()))
            .unwrap_or_else(|| ("/".to_string(), "run aborted".to_string()));

        Err(OrgflowError::RunAborted {
            step,
            reason,
            results: self.steps,
        })
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Position;

    fn path(n: u32) -> StepPath {
        StepPath::root().child(Position::from(n))
    }

    fn result(status: RunStatus, steps: Vec<StepRecord>) -> RunResult {
        RunResult {
            flow: "ci".to_string(),
            status,
            steps,
            started_at: Utc::now(),
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn status_display() {
        assert_eq!(StepStatus::Succeeded.to_string(), "succeeded");
        assert_eq!(StepStatus::Failed.display_char(), '✗');
        assert_eq!(RunStatus::CompletedWithErrors.to_string(), "completed with errors");
    }

    #[test]
    fn into_result_passes_non_aborted_runs() {
        let run = result(RunStatus::CompletedWithErrors, Vec::new());
        assert!(run.into_result().is_ok());
    }

    #[test]
    fn into_result_converts_abort() {
        let err = OrgflowError::TaskFailed {
            task: "deploy".into(),
            message: "boom".into(),
        };
        let run = result(
            RunStatus::Aborted,
            vec![
                StepRecord::succeeded(path(1), "a", Outputs::new(), Duration::ZERO),
                StepRecord::failed(path(2), "deploy", &err, Duration::ZERO),
            ],
        );

        match run.into_result().unwrap_err() {
            OrgflowError::RunAborted {
                step,
                reason,
                results,
            } => {
                assert_eq!(step, "2");
                assert!(reason.contains("boom"));
                assert_eq!(results.len(), 2);
            }
            other => panic!("expected RunAborted, got {:?}", other),
        }
    }

    #[test]
    fn executed_tasks_excludes_skipped() {
        let run = result(
            RunStatus::Succeeded,
            vec![
                StepRecord::succeeded(path(1), "a", Outputs::new(), Duration::ZERO),
                StepRecord::skipped(path(2), "b", "condition false"),
                StepRecord::succeeded(path(3), "c", Outputs::new(), Duration::ZERO),
            ],
        );
        assert_eq!(run.executed_tasks(), vec!["a", "c"]);
        assert_eq!(run.record(&path(2)).unwrap().status, StepStatus::Skipped);
    }

    #[test]
    fn serializes_to_json() {
        let run = result(
            RunStatus::Succeeded,
            vec![StepRecord::skipped(path(1), "a", "skipped by --skip")],
        );
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["status"], "succeeded");
        assert_eq!(json["steps"][0]["path"], "1");
        assert_eq!(json["steps"][0]["status"], "skipped");
        assert_eq!(json["duration_ms"], 5);
        assert!(json["steps"][0].get("error").is_none());
    }
}
