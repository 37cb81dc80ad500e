use serde::Serialize;

use crate::matching::engine::MatchResult;

/// Per-conversation match state.
///
/// Holds the most recently resolved recipe and the recipes from the most recent
/// suggestion round, so later turns can refer to "the recipe" or to a
/// suggestion by its position. Suggestions keep their corpus index next to the
/// name, since names need not be unique. Each conversation owns its own value; it is
/// passed into every engine call and never shared between conversations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    last_match: Option<MatchResult>,
    last_suggestions: Vec<String>,
    suggested_indices: Vec<usize>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn last_match(&self) -> Option<&MatchResult> {
        self.last_match.as_ref()
    }

    pub fn set_last_match(&mut self, result: MatchResult) {
        self.last_match = Some(result);
    }

    pub fn clear_last_match(&mut self) {
        self.last_match = None;
    }

    /// Recipe names from the last suggestion round, best first
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.last_suggestions
    }

    /// Corpus indices from the last suggestion round, parallel to [`Self::suggestions`]
    #[must_use]
    pub fn suggested_indices(&self) -> &[usize] {
        &self.suggested_indices
    }

    /// Replace the suggestion round with `(corpus index, name)` pairs, best first
    pub fn set_suggestions(&mut self, suggested: impl IntoIterator<Item = (usize, String)>) {
        (self.suggested_indices, self.last_suggestions) = suggested.into_iter().unzip();
    }

    /// Corpus index and name at a 1-based position in the last suggestion round
    #[must_use]
    pub fn suggestion_at(&self, ordinal: usize) -> Option<(usize, &str)> {
        let i = ordinal.checked_sub(1)?;
        Some((*self.suggested_indices.get(i)?, self.last_suggestions.get(i)?.as_str()))
    }

    /// Forget everything (end of conversation)
    pub fn clear(&mut self) {
        self.last_match = None;
        self.last_suggestions.clear();
        self.suggested_indices.clear();
    }
}
