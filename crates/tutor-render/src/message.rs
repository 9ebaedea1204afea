//! Chat messages as sent by the tutoring server.
//!
//! These are display projections only; nothing here is persisted. Field
//! names accept both the snake_case and camelCase spellings the server emits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// Rendering hint supplied by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    UserCorrection,
    SessionSummary,
    /// Any hint this client does not know; rendered as text.
    #[serde(other)]
    Unknown,
}

/// Performance recap sent at the end of a tutoring session.
///
/// Every numeric field is optional on the wire and reads as 0 when missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(default, alias = "totalQuestions")]
    pub total_questions: Option<u32>,
    #[serde(default, alias = "correctAnswers")]
    pub correct_answers: Option<u32>,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default, alias = "durationMinutes")]
    pub duration_minutes: Option<u32>,
    #[serde(default, alias = "topicsCovered")]
    pub topics_covered: Vec<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// One chat message record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub message_type: Option<MessageType>,
    #[serde(default)]
    pub diff: Option<String>,
    #[serde(default, alias = "completeAnswer")]
    pub complete_answer: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default, alias = "isCorrect")]
    pub is_correct: Option<bool>,
    #[serde(default, alias = "sessionSummary")]
    pub session_summary: Option<SessionSummary>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Plain text message.
    pub fn text(sender: Sender, message: impl Into<String>) -> Self {
        Self {
            sender,
            message: message.into(),
            message_type: None,
            diff: None,
            complete_answer: None,
            options: None,
            is_correct: None,
            session_summary: None,
            timestamp: None,
        }
    }

    /// AI feedback on a learner's answer.
    pub fn correction(message: impl Into<String>, is_correct: bool) -> Self {
        Self {
            message_type: Some(MessageType::UserCorrection),
            is_correct: Some(is_correct),
            ..Self::text(Sender::Ai, message)
        }
    }

    /// End-of-session recap.
    pub fn summary(summary: SessionSummary) -> Self {
        Self {
            message_type: Some(MessageType::SessionSummary),
            session_summary: Some(summary),
            ..Self::text(Sender::Ai, "")
        }
    }

    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        self.diff = Some(diff.into());
        self
    }

    pub fn with_complete_answer(mut self, answer: impl Into<String>) -> Self {
        self.complete_answer = Some(answer.into());
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_correction() {
        let json = r#"{
            "sender": "ai",
            "message": "Almost!",
            "type": "user_correction",
            "diff": "I <del>goed</del><ins>went</ins>",
            "completeAnswer": "I went home.",
            "isCorrect": false,
            "timestamp": "2026-03-01T10:15:00Z"
        }"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.sender, Sender::Ai);
        assert_eq!(msg.message_type, Some(MessageType::UserCorrection));
        assert_eq!(msg.is_correct, Some(false));
        assert_eq!(msg.complete_answer.as_deref(), Some("I went home."));
        assert!(msg.timestamp.is_some());
    }

    #[test]
    fn test_unknown_type_deserializes() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"sender":"ai","message":"hi","type":"quiz_card"}"#).unwrap();
        assert_eq!(msg.message_type, Some(MessageType::Unknown));
    }

    #[test]
    fn test_summary_missing_numbers() {
        let msg: ChatMessage = serde_json::from_str(
            r#"{"sender":"ai","message":"","sessionSummary":{"topicsCovered":["verbs"]}}"#,
        )
        .unwrap();
        let summary = msg.session_summary.unwrap();
        assert_eq!(summary.total_questions, None);
        assert_eq!(summary.percentage, None);
        assert_eq!(summary.topics_covered, vec!["verbs".to_string()]);
    }
}
