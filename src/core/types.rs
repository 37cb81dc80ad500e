use serde::{Deserialize, Serialize};

/// Confidence level for a name match, derived from its similarity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
    Exact,
}

impl Confidence {
    /// Classify a `[0, 100]` similarity score
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 100.0 {
            Self::Exact
        } else if score >= 90.0 {
            Self::High
        } else if score >= 75.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "EXACT"),
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Low => write!(f, "LOW"),
        }
    }
}
