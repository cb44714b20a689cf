//! Outcomes of `check` and `save`, rendered to text only at the agent boundary.

use serde::Serialize;
use std::fmt;

/// Which key of a stored record matched the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedOn {
    Url,
    Name,
    Summary,
}

impl fmt::Display for MatchedOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchedOn::Url => "url",
            MatchedOn::Name => "name",
            MatchedOn::Summary => "summary",
        };
        f.write_str(label)
    }
}

/// Result of checking a candidate against a category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Exact match after normalization
    Duplicate { matched_on: MatchedOn },
    /// Near-duplicate fact; `matched` is the stored summary as written
    Similar { matched: String, score: f64 },
    New,
}

impl Verdict {
    pub fn is_new(&self) -> bool {
        matches!(self, Verdict::New)
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Verdict::Duplicate { .. })
    }
}

/// Result of a save attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved,
    AlreadySaved { matched_on: MatchedOn },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}
