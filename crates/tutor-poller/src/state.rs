//! Per-subject view state held by the poller.

use serde::Serialize;

use tutor_core::{GenerationState, GenerationStatus};

/// Why monitoring of a subject ended in failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    /// The backend reported the generation as failed.
    Generation { message: Option<String> },
    /// No terminal status arrived before the polling ceiling.
    TimedOut,
    /// Too many consecutive status fetches failed.
    PollError { message: String },
}

/// Lifecycle of one subject as seen by the poller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubjectState {
    Idle,
    Requested,
    Polling,
    /// A reset request for the subject is in flight.
    Resetting,
    Completed,
    Failed(FailureReason),
}

impl SubjectState {
    /// Requested, polling or resetting: a start or reset must wait.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SubjectState::Requested | SubjectState::Polling | SubjectState::Resetting
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubjectState::Completed | SubjectState::Failed(_))
    }

    /// View state for a status observed outside of an active poll.
    pub fn from_status(status: &GenerationStatus) -> Self {
        match status.status {
            GenerationState::Completed => SubjectState::Completed,
            GenerationState::Failed => SubjectState::Failed(FailureReason::Generation {
                message: status.error_message.clone(),
            }),
            GenerationState::Pending | GenerationState::InProgress => SubjectState::Idle,
        }
    }
}

/// Snapshot entry for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectView {
    pub subject_id: i64,
    #[serde(flatten)]
    pub state: SubjectState,
    /// Most recent status the backend reported, kept across timeouts.
    pub last_status: Option<GenerationStatus>,
    /// Status fetches made by the current or most recent poll.
    pub fetch_count: u32,
}

impl SubjectView {
    pub fn idle(subject_id: i64) -> Self {
        Self {
            subject_id,
            state: SubjectState::Idle,
            last_status: None,
            fetch_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        let mut status = GenerationStatus::pending(1, 2);
        assert_eq!(SubjectState::from_status(&status), SubjectState::Idle);

        status.status = GenerationState::Completed;
        assert_eq!(SubjectState::from_status(&status), SubjectState::Completed);

        status.status = GenerationState::Failed;
        status.error_message = Some("quota".into());
        assert_eq!(
            SubjectState::from_status(&status),
            SubjectState::Failed(FailureReason::Generation {
                message: Some("quota".into())
            })
        );
    }

    #[test]
    fn test_active_and_terminal() {
        assert!(SubjectState::Requested.is_active());
        assert!(SubjectState::Polling.is_active());
        assert!(SubjectState::Resetting.is_active());
        assert!(!SubjectState::Resetting.is_terminal());
        assert!(!SubjectState::Idle.is_active());
        assert!(SubjectState::Failed(FailureReason::TimedOut).is_terminal());
        assert!(!SubjectState::Polling.is_terminal());
    }

    #[test]
    fn test_view_serialization() {
        let view = SubjectView {
            state: SubjectState::Failed(FailureReason::TimedOut),
            ..SubjectView::idle(4)
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["subject_id"], 4);
        assert_eq!(json["state"], "failed");
    }
}
