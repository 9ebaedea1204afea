//! Message → view dispatch.
//!
//! [`classify`] decides the rendering mode once, producing a [`MessageKind`];
//! [`render`] then derives colors from the sender and feedback flags. Both are
//! pure: the same message always yields the same view.

use serde::Serialize;

use crate::diff::{self, Segment};
use crate::message::{ChatMessage, MessageType, Sender};
use crate::palette::{self, BubbleStyle};
use crate::summary::SummaryView;

/// Options offered under a correction when the server sends none.
pub const DEFAULT_OPTIONS: [&str; 2] = ["Got it!", "Explain more"];

/// Maximum number of response options rendered under a correction.
pub const MAX_OPTIONS: usize = 2;

/// Body of a correction message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CorrectionBody {
    /// The answer was right (or no diff was supplied): show the message as is.
    Plain { text: String },
    /// The answer was wrong: show the diff.
    Diff { segments: Vec<Segment> },
}

/// AI feedback on a learner's answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correction {
    pub is_correct: bool,
    pub body: CorrectionBody,
    pub complete_answer: Option<String>,
    /// Between one and [`MAX_OPTIONS`] entries.
    pub options: Vec<String>,
}

/// Rendering mode of a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MessageKind {
    Text { text: String },
    Correction(Correction),
    SessionSummary(SummaryView),
}

/// Everything a chat bubble needs to draw a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    pub sender: Sender,
    pub style: BubbleStyle,
    /// "HH:MM" in UTC, when the message carries a timestamp.
    pub time_label: Option<String>,
    pub kind: MessageKind,
}

/// Pick the rendering mode: summary payload, then correction type, then text.
pub fn classify(msg: &ChatMessage) -> MessageKind {
    if let Some(summary) = &msg.session_summary {
        return MessageKind::SessionSummary(SummaryView::from_summary(summary));
    }

    match msg.message_type {
        Some(MessageType::UserCorrection) => MessageKind::Correction(build_correction(msg)),
        Some(MessageType::Text)
        | Some(MessageType::SessionSummary)
        | Some(MessageType::Unknown)
        | None => MessageKind::Text {
            text: msg.message.clone(),
        },
    }
}

fn build_correction(msg: &ChatMessage) -> Correction {
    let is_correct = msg.is_correct.unwrap_or(false);

    let diff_markup = msg
        .diff
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let body = match (is_correct, diff_markup) {
        (false, Some(markup)) => CorrectionBody::Diff {
            segments: diff::parse_markup(markup),
        },
        _ => CorrectionBody::Plain {
            text: msg.message.clone(),
        },
    };

    let complete_answer = msg
        .complete_answer
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from);

    Correction {
        is_correct,
        body,
        complete_answer,
        options: resolve_options(msg.options.as_deref()),
    }
}

/// Up to two non-blank server options, or the canonical pair when there are none.
pub fn resolve_options(options: Option<&[String]>) -> Vec<String> {
    let supplied: Vec<String> = options
        .unwrap_or_default()
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .take(MAX_OPTIONS)
        .map(String::from)
        .collect();

    if supplied.is_empty() {
        DEFAULT_OPTIONS.iter().map(|o| o.to_string()).collect()
    } else {
        supplied
    }
}

/// Bubble colors from the sender and, for corrections, the feedback flag.
pub fn bubble_style(sender: Sender, kind: &MessageKind) -> BubbleStyle {
    match (sender, kind) {
        (_, MessageKind::Correction(c)) if c.is_correct => BubbleStyle {
            background: palette::SUCCESS_BUBBLE,
            text: palette::SUCCESS_TEXT,
        },
        (_, MessageKind::Correction(_)) => BubbleStyle {
            background: palette::ERROR_BUBBLE,
            text: palette::ERROR_TEXT,
        },
        (Sender::User, _) => BubbleStyle {
            background: palette::PRIMARY,
            text: palette::TEXT_LIGHT,
        },
        (Sender::Ai, _) => BubbleStyle {
            background: palette::NEUTRAL_BUBBLE,
            text: palette::TEXT_DARK,
        },
    }
}

/// Render a message into its view description.
pub fn render(msg: &ChatMessage) -> MessageView {
    let kind = classify(msg);
    MessageView {
        sender: msg.sender,
        style: bubble_style(msg.sender, &kind),
        time_label: msg.timestamp.map(|t| t.format("%H:%M").to_string()),
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::SessionSummary;
    use crate::summary::PerformanceTier;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_plain_text_user_message() {
        let view = render(&ChatMessage::text(Sender::User, "What is a verb?"));
        assert_eq!(
            view.kind,
            MessageKind::Text {
                text: "What is a verb?".into()
            }
        );
        assert_eq!(view.style.background, palette::PRIMARY);
        assert_eq!(view.style.text, palette::TEXT_LIGHT);
        assert!(view.time_label.is_none());
    }

    #[test]
    fn test_ai_text_uses_neutral_bubble() {
        let view = render(&ChatMessage::text(Sender::Ai, "A verb is an action word."));
        assert_eq!(view.style.background, palette::NEUTRAL_BUBBLE);
        assert_eq!(view.style.text, palette::TEXT_DARK);
    }

    #[test]
    fn test_correct_answer_never_renders_diff() {
        let msg = ChatMessage::correction("Perfect!", true)
            .with_diff("I <del>goed</del><ins>went</ins> home");
        let view = render(&msg);

        match &view.kind {
            MessageKind::Correction(c) => {
                assert!(c.is_correct);
                assert_eq!(
                    c.body,
                    CorrectionBody::Plain {
                        text: "Perfect!".into()
                    }
                );
            }
            other => panic!("expected correction, got {:?}", other),
        }
        assert_eq!(view.style.background, palette::SUCCESS_BUBBLE);
    }

    #[test]
    fn test_incorrect_answer_renders_segments_and_answer() {
        let msg = ChatMessage::correction("Almost!", false)
            .with_diff("I <del>goed</del><ins>went</ins> home")
            .with_complete_answer("I went home yesterday.");
        let view = render(&msg);

        let MessageKind::Correction(c) = &view.kind else {
            panic!("expected correction");
        };
        let CorrectionBody::Diff { segments } = &c.body else {
            panic!("expected diff body");
        };
        assert_eq!(segments.len(), 4);
        assert_eq!(c.complete_answer.as_deref(), Some("I went home yesterday."));
        assert_eq!(view.style.background, palette::ERROR_BUBBLE);
        assert_eq!(view.style.text, palette::ERROR_TEXT);
    }

    #[test]
    fn test_incorrect_without_diff_falls_back_to_message() {
        let msg = ChatMessage::correction("Try again", false).with_diff("   ");
        let MessageKind::Correction(c) = classify(&msg) else {
            panic!("expected correction");
        };
        assert_eq!(
            c.body,
            CorrectionBody::Plain {
                text: "Try again".into()
            }
        );
    }

    #[test]
    fn test_default_options_when_omitted() {
        let MessageKind::Correction(c) = classify(&ChatMessage::correction("ok", true)) else {
            panic!("expected correction");
        };
        assert_eq!(c.options, vec!["Got it!".to_string(), "Explain more".to_string()]);
    }

    #[test]
    fn test_options_blank_entries_use_defaults() {
        let options = resolve_options(Some(["  ".to_string(), String::new()].as_slice()));
        assert_eq!(options.len(), 2);
        assert_eq!(options[0], DEFAULT_OPTIONS[0]);
    }

    #[test]
    fn test_options_capped_at_two() {
        let msg = ChatMessage::correction("no", false).with_options(vec![
            "Show me".into(),
            "Next".into(),
            "Skip".into(),
        ]);
        let MessageKind::Correction(c) = classify(&msg) else {
            panic!("expected correction");
        };
        assert_eq!(c.options, vec!["Show me".to_string(), "Next".to_string()]);
    }

    #[test]
    fn test_single_server_option_kept() {
        let options = resolve_options(Some(["Continue".to_string()].as_slice()));
        assert_eq!(options, vec!["Continue".to_string()]);
    }

    #[test]
    fn test_summary_takes_precedence_over_type() {
        let mut msg = ChatMessage::correction("ignored", false);
        msg.session_summary = Some(SessionSummary {
            percentage: Some(85.0),
            ..Default::default()
        });
        let MessageKind::SessionSummary(view) = classify(&msg) else {
            panic!("expected summary");
        };
        assert_eq!(view.tier, PerformanceTier::Excellent);
    }

    #[test]
    fn test_summary_type_without_payload_is_text() {
        let mut msg = ChatMessage::text(Sender::Ai, "Session over");
        msg.message_type = Some(MessageType::SessionSummary);
        assert!(matches!(classify(&msg), MessageKind::Text { .. }));
    }

    #[test]
    fn test_time_label() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 9, 5, 0).unwrap();
        let view = render(&ChatMessage::text(Sender::Ai, "hi").with_timestamp(ts));
        assert_eq!(view.time_label.as_deref(), Some("09:05"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let msg = ChatMessage::correction("Almost", false).with_diff("<ins>a</ins>");
        assert_eq!(render(&msg), render(&msg));
    }

    #[test]
    fn test_view_serializes_with_mode_tag() {
        let view = render(&ChatMessage::summary(SessionSummary::default()));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["kind"]["mode"], "session_summary");
        assert_eq!(json["kind"]["tier"], "needs_work");
    }
}
