//! Writing modes offered by the composer.
//!
//! The set is closed: each mode selects exactly one prompt template, and
//! adding a variant forces every `match` over it to be revisited.

use serde::{Deserialize, Serialize};

/// The four ways the composer can treat a piece of input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WritingMode {
    /// Topic or outline in, structured essay out
    #[default]
    Draft,
    /// Rough prose in, smoother prose out
    Refine,
    /// Casual register in, formal academic register out
    Academic,
    /// Citation and logic review, no rewriting
    Critique,
}

impl WritingMode {
    pub fn all() -> &'static [WritingMode] {
        &[
            WritingMode::Draft,
            WritingMode::Refine,
            WritingMode::Academic,
            WritingMode::Critique,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WritingMode::Draft => "draft",
            WritingMode::Refine => "refine",
            WritingMode::Academic => "academic",
            WritingMode::Critique => "critique",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WritingMode::Draft => "Draft Generator",
            WritingMode::Refine => "Polishing Engine",
            WritingMode::Academic => "Style Transfer",
            WritingMode::Critique => "Reviewer",
        }
    }

    /// One-line description shown under the mode name.
    pub fn tagline(&self) -> &'static str {
        match self {
            WritingMode::Draft => "Topic → Structured Essay",
            WritingMode::Refine => "Rough → Smooth Prose",
            WritingMode::Academic => "Casual → Academic",
            WritingMode::Critique => "Citation & Logic Check",
        }
    }
}

impl std::fmt::Display for WritingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
