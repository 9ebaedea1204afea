//! Session summary tiers.

use serde::Serialize;

use crate::message::SessionSummary;
use crate::palette;

/// Percentage at or above which a session is excellent.
pub const EXCELLENT_THRESHOLD: f64 = 80.0;

/// Percentage at or above which a session is good.
pub const GOOD_THRESHOLD: f64 = 50.0;

/// Performance band derived from the session percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Excellent,
    Good,
    NeedsWork,
}

impl PerformanceTier {
    /// Band for a percentage. NaN falls in the lowest band.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= EXCELLENT_THRESHOLD {
            PerformanceTier::Excellent
        } else if percentage >= GOOD_THRESHOLD {
            PerformanceTier::Good
        } else {
            PerformanceTier::NeedsWork
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            PerformanceTier::Excellent => palette::TIER_EXCELLENT,
            PerformanceTier::Good => palette::TIER_GOOD,
            PerformanceTier::NeedsWork => palette::TIER_NEEDS_WORK,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent work!",
            PerformanceTier::Good => "Good progress",
            PerformanceTier::NeedsWork => "Keep practicing",
        }
    }
}

/// Display data for a session summary card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub percentage: f64,
    pub duration_minutes: u32,
    pub topics_covered: Vec<String>,
    pub feedback: Option<String>,
    pub tier: PerformanceTier,
    pub tier_color: &'static str,
    pub tier_label: &'static str,
}

impl SummaryView {
    pub fn from_summary(summary: &SessionSummary) -> Self {
        let percentage = summary.percentage.unwrap_or(0.0);
        let tier = PerformanceTier::from_percentage(percentage);
        Self {
            total_questions: summary.total_questions.unwrap_or(0),
            correct_answers: summary.correct_answers.unwrap_or(0),
            percentage,
            duration_minutes: summary.duration_minutes.unwrap_or(0),
            topics_covered: summary.topics_covered.clone(),
            feedback: summary.feedback.clone(),
            tier,
            tier_color: tier.color(),
            tier_label: tier.label(),
        }
    }

    /// Percentage rounded for display, e.g. "67%".
    pub fn percentage_label(&self) -> String {
        format!("{}%", self.percentage.round() as i64)
    }
}
