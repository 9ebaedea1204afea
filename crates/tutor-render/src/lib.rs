//! # tutor-render
//!
//! Chat message renderer for tutoring sessions.
//!
//! Turns server-sent chat records into view descriptions: rendering mode,
//! bubble colors, correction diff segments, response options and session
//! summary tiers. Everything here is pure and deterministic.
//!
//! ```
//! use tutor_render::{render, ChatMessage, MessageKind};
//!
//! let msg = ChatMessage::correction("Almost!", false)
//!     .with_diff("I <del>goed</del><ins>went</ins> home");
//! let view = render(&msg);
//! assert!(matches!(view.kind, MessageKind::Correction(_)));
//! ```

pub mod diff;
pub mod message;
pub mod palette;
pub mod render;
pub mod summary;

pub use diff::{diff_words, parse_markup, to_markup, Segment, SegmentKind};
pub use message::{ChatMessage, MessageType, Sender, SessionSummary};
pub use palette::{BubbleStyle, TextStyle};
pub use render::{
    bubble_style, classify, render, resolve_options, Correction, CorrectionBody, MessageKind,
    MessageView, DEFAULT_OPTIONS,
};
pub use summary::{PerformanceTier, SummaryView};
