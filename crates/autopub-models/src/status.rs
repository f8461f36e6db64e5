//! Job status state machine.
//!
//! Every pipeline mutation goes through [`JobStatus::can_transition`];
//! illegal transitions are rejected instead of silently overwritten.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when a status transition is not legal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal status transition: {from} -> {to}")]
pub struct StatusError {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// Processing status of a job.
///
/// Serialized in SCREAMING_SNAKE_CASE to match the wire form the
/// submission layer stores (`READY`, `UPLOADING`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Queued, never processed
    #[default]
    Ready,
    /// Queued again after an external retry reset
    Retry,
    /// Synthesis and render in progress
    Rendering,
    /// Local artifacts ready, upload not started
    Done,
    /// Upload to the video platform in progress
    Uploading,
    /// Uploaded and publicly visible
    Published,
    /// Uploaded privately with a future publish timestamp
    Scheduled,
    /// Terminal failure; requires an external retry reset
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Ready => "READY",
            JobStatus::Retry => "RETRY",
            JobStatus::Rendering => "RENDERING",
            JobStatus::Done => "DONE",
            JobStatus::Uploading => "UPLOADING",
            JobStatus::Published => "PUBLISHED",
            JobStatus::Scheduled => "SCHEDULED",
            JobStatus::Failed => "FAILED",
        }
    }

    /// A terminal status takes no further automatic action.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Published | JobStatus::Scheduled | JobStatus::Failed
        )
    }

    /// An eligible job may be claimed by the runner.
    pub fn is_eligible(&self) -> bool {
        matches!(self, JobStatus::Ready | JobStatus::Retry)
    }

    /// Whether moving from `self` to `to` is a legal transition.
    ///
    /// Forward-only, except the explicit `Failed -> Retry` reset. Any
    /// non-terminal status may fail.
    pub fn can_transition(&self, to: JobStatus) -> bool {
        use JobStatus::*;
        if to == Failed {
            return !self.is_terminal();
        }
        matches!(
            (*self, to),
            (Ready, Rendering)
                | (Retry, Rendering)
                | (Rendering, Done)
                | (Done, Uploading)
                | (Uploading, Published)
                | (Uploading, Scheduled)
                | (Failed, Retry)
        )
    }

    /// Validate a transition, returning the new status.
    pub fn transition(&self, to: JobStatus) -> Result<JobStatus, StatusError> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(StatusError { from: *self, to })
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let order = [
            JobStatus::Ready,
            JobStatus::Rendering,
            JobStatus::Done,
            JobStatus::Uploading,
            JobStatus::Published,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].can_transition(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(JobStatus::Uploading.can_transition(JobStatus::Scheduled));
        assert!(JobStatus::Retry.can_transition(JobStatus::Rendering));
    }

    #[test]
    fn test_any_non_terminal_may_fail() {
        for status in [
            JobStatus::Ready,
            JobStatus::Retry,
            JobStatus::Rendering,
            JobStatus::Done,
            JobStatus::Uploading,
        ] {
            assert!(status.can_transition(JobStatus::Failed));
        }
        assert!(!JobStatus::Published.can_transition(JobStatus::Failed));
        assert!(!JobStatus::Scheduled.can_transition(JobStatus::Failed));
        assert!(!JobStatus::Failed.can_transition(JobStatus::Failed));
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!JobStatus::Published.can_transition(JobStatus::Rendering));
        assert!(!JobStatus::Uploading.can_transition(JobStatus::Rendering));
        assert!(!JobStatus::Done.can_transition(JobStatus::Ready));
        assert!(!JobStatus::Scheduled.can_transition(JobStatus::Retry));
    }

    #[test]
    fn test_retry_only_from_failed() {
        assert!(JobStatus::Failed.can_transition(JobStatus::Retry));
        assert!(!JobStatus::Ready.can_transition(JobStatus::Retry));
        assert!(!JobStatus::Published.can_transition(JobStatus::Retry));
    }

    #[test]
    fn test_transition_error_detail() {
        let err = JobStatus::Published
            .transition(JobStatus::Rendering)
            .unwrap_err();
        assert_eq!(err.from, JobStatus::Published);
        assert_eq!(err.to, JobStatus::Rendering);
    }

    #[test]
    fn test_wire_form() {
        let json = serde_json::to_string(&JobStatus::Uploading).unwrap();
        assert_eq!(json, "\"UPLOADING\"");
        let back: JobStatus = serde_json::from_str("\"SCHEDULED\"").unwrap();
        assert_eq!(back, JobStatus::Scheduled);
    }
}
