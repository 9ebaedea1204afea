//! Color tokens and text styles used by rendered chat views.

use serde::Serialize;

/// Primary brand color; user bubbles.
pub const PRIMARY: &str = "#4F46E5";
/// Neutral bubble background for AI messages.
pub const NEUTRAL_BUBBLE: &str = "#F3F4F6";

pub const TEXT_LIGHT: &str = "#FFFFFF";
pub const TEXT_DARK: &str = "#111827";

/// Correct-answer feedback.
pub const SUCCESS_BUBBLE: &str = "#DCFCE7";
pub const SUCCESS_TEXT: &str = "#166534";

/// Incorrect-answer feedback.
pub const ERROR_BUBBLE: &str = "#FEE2E2";
pub const ERROR_TEXT: &str = "#991B1B";

pub const DIFF_DELETED: &str = "#DC2626";
pub const DIFF_INSERTED: &str = "#16A34A";

/// Session summary tiers.
pub const TIER_EXCELLENT: &str = "#22C55E";
pub const TIER_GOOD: &str = "#F59E0B";
pub const TIER_NEEDS_WORK: &str = "#EF4444";

/// Bubble colors for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BubbleStyle {
    pub background: &'static str,
    pub text: &'static str,
}

/// Inline text styling for one run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextStyle {
    pub color: &'static str,
    pub strike_through: bool,
    pub bold: bool,
}
