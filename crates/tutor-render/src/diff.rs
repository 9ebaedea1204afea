//! Correction diffs as tagged segments.
//!
//! Corrections reach the client either as inline markup
//! (`I <del>goed</del><ins>went</ins> home`) or as an original/corrected
//! sentence pair. Both are turned into a flat [`Segment`] sequence here so the
//! renderer never inspects markup strings itself.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

use crate::palette::{self, TextStyle};

static MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<del>(.*?)</del>|<ins>(.*?)</ins>").expect("diff markup regex is valid")
});

/// What a segment of a correction represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Text the learner got right.
    Plain,
    /// Text the learner wrote that should be removed.
    Deleted,
    /// Text that should be added.
    Inserted,
}

impl SegmentKind {
    /// Strike-through for deletions, emphasis for insertions.
    pub fn style(self) -> TextStyle {
        match self {
            SegmentKind::Plain => TextStyle {
                color: palette::TEXT_DARK,
                strike_through: false,
                bold: false,
            },
            SegmentKind::Deleted => TextStyle {
                color: palette::DIFF_DELETED,
                strike_through: true,
                bold: false,
            },
            SegmentKind::Inserted => TextStyle {
                color: palette::DIFF_INSERTED,
                strike_through: false,
                bold: true,
            },
        }
    }
}

/// A run of text with a single diff kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    pub fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Append `text` to `segments`, merging with the previous run of the same kind.
fn push(segments: &mut Vec<Segment>, kind: SegmentKind, text: &str) {
    if text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(last) if last.kind == kind => last.text.push_str(text),
        _ => segments.push(Segment::new(kind, text)),
    }
}

/// Parse inline diff markup into segments.
///
/// Only paired `<del>…</del>` and `<ins>…</ins>` markers are recognized; an
/// unpaired marker stays in the plain text verbatim.
pub fn parse_markup(markup: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in MARKUP.captures_iter(markup) {
        let Some(whole) = caps.get(0) else { continue };
        push(&mut segments, SegmentKind::Plain, &markup[cursor..whole.start()]);

        if let Some(deleted) = caps.get(1) {
            push(&mut segments, SegmentKind::Deleted, deleted.as_str());
        } else if let Some(inserted) = caps.get(2) {
            push(&mut segments, SegmentKind::Inserted, inserted.as_str());
        }
        cursor = whole.end();
    }

    push(&mut segments, SegmentKind::Plain, &markup[cursor..]);
    segments
}

/// Word-level diff between what the learner wrote and the correction.
pub fn diff_words(original: &str, corrected: &str) -> Vec<Segment> {
    let diff = TextDiff::from_words(original, corrected);
    let mut segments = Vec::new();

    for change in diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Equal => SegmentKind::Plain,
            ChangeTag::Delete => SegmentKind::Deleted,
            ChangeTag::Insert => SegmentKind::Inserted,
        };
        push(&mut segments, kind, change.value());
    }

    segments
}

/// Serialize segments back into inline markup.
pub fn to_markup(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment.kind {
            SegmentKind::Plain => out.push_str(&segment.text),
            SegmentKind::Deleted => {
                out.push_str("<del>");
                out.push_str(&segment.text);
                out.push_str("</del>");
            }
            SegmentKind::Inserted => {
                out.push_str("<ins>");
                out.push_str(&segment.text);
                out.push_str("</ins>");
            }
        }
    }
    out
}

/// Whether the segments contain any actual change.
pub fn has_changes(segments: &[Segment]) -> bool {
    segments.iter().any(|s| s.kind != SegmentKind::Plain)
}
