use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::store::RecipeCorpus;
use crate::catalog::taxonomy::RestrictionTaxonomy;
use crate::core::recipe::Recipe;
use crate::core::types::Confidence;
use crate::matching::compliance::{
    ComplianceFilter, DEFAULT_CONTAINMENT_THRESHOLD, DEFAULT_LABEL_THRESHOLD,
};
use crate::matching::scoring::{Levenshtein, Similarity};
use crate::matching::session::SessionState;

/// Default number of name candidates considered before giving up on restrictions
pub const DEFAULT_NAME_CANDIDATES: usize = 10;

/// Default minimum name similarity for a recipe to be a candidate at all
pub const DEFAULT_NAME_SCORE_FLOOR: f64 = 30.0;

/// Default cap on candidates kept by coarse ingredient retrieval
pub const DEFAULT_COARSE_LIMIT: usize = 1200;

/// Default minimum coarse ingredient score
pub const DEFAULT_COARSE_FLOOR: f64 = 35.0;

/// Default minimum refined ingredient score
pub const DEFAULT_REFINED_FLOOR: f64 = 60.0;

/// Default number of suggestions returned
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Classified, recoverable failure of a lookup
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("No recipe found matching '{0}'")]
    NotFound(String),

    #[error("'{name}' does not satisfy the restriction '{restriction}', and no similar recipe does")]
    RestrictionConflict { name: String, restriction: String },

    #[error("Selection {selection} is out of range (choose 1-{available})")]
    InvalidSelection { selection: String, available: usize },

    #[error("No ingredients were provided")]
    EmptyInput,

    #[error("Every ingredient conflicts with the requested restrictions: {}", .excluded.join(", "))]
    AllIngredientsExcluded { excluded: Vec<String> },

    #[error("No recipes match the given ingredients")]
    NoSuggestionsMatched,
}

impl MatchError {
    /// Stable snake_case tag for structured output
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::RestrictionConflict { .. } => "restriction_conflict",
            Self::InvalidSelection { .. } => "invalid_selection",
            Self::EmptyInput => "empty_input",
            Self::AllIngredientsExcluded { .. } => "all_ingredients_excluded",
            Self::NoSuggestionsMatched => "no_suggestions_matched",
        }
    }
}

/// A recipe resolved by name
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    /// Index of the recipe in the corpus
    pub index: usize,

    /// Name similarity in `[0, 100]`
    pub score: f64,
}

impl MatchResult {
    #[must_use]
    pub fn confidence(&self) -> Confidence {
        Confidence::from_score(self.score)
    }
}

/// Thresholds and limits used by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum similarity between a restriction word and a taxonomy label
    pub label_threshold: f64,
    /// Minimum partial similarity between a forbidden term and an ingredient
    pub containment_threshold: f64,
    /// Number of name candidates tried in order
    pub name_candidates: usize,
    /// Minimum name similarity for a candidate
    pub name_score_floor: f64,
    /// Maximum candidates kept by coarse ingredient retrieval
    pub coarse_limit: usize,
    /// Minimum coarse ingredient score
    pub coarse_floor: f64,
    /// Minimum refined ingredient score
    pub refined_floor: f64,
    /// Number of suggestions returned
    pub suggestion_limit: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            label_threshold: DEFAULT_LABEL_THRESHOLD,
            containment_threshold: DEFAULT_CONTAINMENT_THRESHOLD,
            name_candidates: DEFAULT_NAME_CANDIDATES,
            name_score_floor: DEFAULT_NAME_SCORE_FLOOR,
            coarse_limit: DEFAULT_COARSE_LIMIT,
            coarse_floor: DEFAULT_COARSE_FLOOR,
            refined_floor: DEFAULT_REFINED_FLOOR,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl MatchingConfig {
    /// Parse a (possibly partial) configuration; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The main matching engine
pub struct MatchingEngine<'a, S: Similarity = Levenshtein> {
    pub(crate) corpus: &'a RecipeCorpus,
    taxonomy: &'a RestrictionTaxonomy,
    /// Configuration including thresholds and limits
    pub(crate) config: MatchingConfig,
    pub(crate) scorer: S,
}

impl<'a> MatchingEngine<'a> {
    /// Create a new matching engine with default configuration
    pub fn new(corpus: &'a RecipeCorpus, taxonomy: &'a RestrictionTaxonomy) -> Self {
        Self::with_config(corpus, taxonomy, MatchingConfig::default())
    }

    /// Create a new matching engine with custom configuration
    pub fn with_config(
        corpus: &'a RecipeCorpus,
        taxonomy: &'a RestrictionTaxonomy,
        config: MatchingConfig,
    ) -> Self {
        Self {
            corpus,
            taxonomy,
            config,
            scorer: Levenshtein,
        }
    }
}

impl<'a, S: Similarity> MatchingEngine<'a, S> {
    /// Swap the similarity implementation
    pub fn with_scorer<T: Similarity>(self, scorer: T) -> MatchingEngine<'a, T> {
        MatchingEngine {
            corpus: self.corpus,
            taxonomy: self.taxonomy,
            config: self.config,
            scorer,
        }
    }

    pub fn corpus(&self) -> &'a RecipeCorpus {
        self.corpus
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Restriction filter using this engine's scorer and thresholds
    pub fn compliance(&self) -> ComplianceFilter<'_, S> {
        ComplianceFilter::new(self.taxonomy, &self.scorer)
            .with_thresholds(self.config.label_threshold, self.config.containment_threshold)
    }

    /// Look up the recipe behind a match
    pub fn recipe(&self, result: &MatchResult) -> Option<&'a Recipe> {
        self.corpus.get(result.index)
    }

    /// Resolve a possibly misspelled recipe name to a recipe satisfying `restriction`.
    ///
    /// A bare number selects from the session's last suggestion round (1-based)
    /// and returns that exact recipe when it complies. Name candidates are
    /// tried best first, and the first one that complies is returned and
    /// remembered in the session.
    ///
    /// # Errors
    ///
    /// - `InvalidSelection` if a number is outside the last suggestion round
    /// - `NotFound` if no recipe name is similar enough
    /// - `RestrictionConflict` if similar names exist but none complies
    pub fn resolve_by_name(
        &self,
        session: &mut SessionState,
        raw_name: &str,
        restriction: &str,
    ) -> Result<MatchResult, MatchError> {
        let filter = self.compliance();
        let entries = filter.resolve_restrictions(restriction);

        let name = match select(session, raw_name)? {
            Selection::Suggested { index, name } => {
                let chosen = self.corpus.get(index).filter(|r| r.name == name);
                if let Some(recipe) = chosen {
                    if filter.complies_with(recipe, &entries) {
                        tracing::debug!("Selected suggestion '{}' (index {index})", recipe.name);
                        let result = MatchResult {
                            index,
                            score: 100.0,
                        };
                        session.set_last_match(result);
                        return Ok(result);
                    }
                }
                // fall back to the closest compliant recipe by name
                name
            }
            Selection::Name(name) => name,
        };

        let candidates = self.name_candidates(&name);
        let Some(best) = candidates.first() else {
            tracing::debug!("No name candidates for '{name}'");
            return Err(MatchError::NotFound(name));
        };

        for candidate in &candidates {
            let recipe = &self.corpus.recipes[candidate.index];
            if filter.complies_with(recipe, &entries) {
                tracing::debug!(
                    "Resolved '{name}' to '{}' ({:.1})",
                    recipe.name,
                    candidate.score
                );
                session.set_last_match(*candidate);
                return Ok(*candidate);
            }
            tracing::debug!("Skipping '{}': violates '{restriction}'", recipe.name);
        }

        Err(MatchError::RestrictionConflict {
            name: self.corpus.recipes[best.index].name.clone(),
            restriction: restriction.trim().to_string(),
        })
    }

    /// Top recipes by name similarity, best first, ties in corpus order
    pub fn name_candidates(&self, name: &str) -> Vec<MatchResult> {
        if name.trim().is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<MatchResult> = self
            .corpus
            .recipes
            .iter()
            .enumerate()
            .map(|(index, recipe)| MatchResult {
                index,
                score: self.scorer.weighted_ratio(name, &recipe.name),
            })
            .filter(|m| m.score >= self.config.name_score_floor)
            .collect();

        // Stable sort keeps corpus order among equal scores
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(self.config.name_candidates);
        candidates
    }
}

/// What a lookup refers to: a name to score, or a recipe from the last suggestion round
enum Selection {
    Name(String),
    Suggested { index: usize, name: String },
}

/// Interpret a bare number as a 1-based pick from the session's suggestions
fn select(session: &SessionState, raw_name: &str) -> Result<Selection, MatchError> {
    let trimmed = raw_name.trim();
    let is_ordinal = !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit());
    if !is_ordinal || session.suggestions().is_empty() {
        return Ok(Selection::Name(trimmed.to_string()));
    }

    // digits too large for usize are out of range like any other
    trimmed
        .parse::<usize>()
        .ok()
        .and_then(|ordinal| session.suggestion_at(ordinal))
        .map(|(index, name)| Selection::Suggested {
            index,
            name: name.to_string(),
        })
        .ok_or_else(|| MatchError::InvalidSelection {
            selection: trimmed.to_string(),
            available: session.suggestions().len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(name: &str, ingredients: &[&str]) -> Recipe {
        Recipe::new(name, ingredients.iter().copied(), ["Cook it."])
    }

    fn soup_corpus() -> RecipeCorpus {
        RecipeCorpus::from_recipes([
            recipe(
                "Chicken Noodle Soup",
                &["chicken", "egg noodles", "carrot", "celery", "chicken broth"],
            ),
            recipe(
                "Chicken Noodle Soup (Vegetarian)",
                &["egg noodles", "carrot", "celery", "vegetable broth"],
            ),
            recipe("Pancakes", &["flour", "milk", "eggs"]),
        ])
    }

    #[test]
    fn test_resolve_exact_name() {
        let corpus = soup_corpus();
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut session = SessionState::new();

        let result = engine
            .resolve_by_name(&mut session, "pancakes", "")
            .unwrap();
        assert_eq!(result.index, 2);
        assert!((result.score - 100.0).abs() < 0.01);
        assert_eq!(result.confidence(), Confidence::Exact);
        assert_eq!(session.last_match(), Some(&result));
    }

    #[test]
    fn test_resolve_tolerates_misspelling() {
        let corpus = soup_corpus();
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut session = SessionState::new();

        let result = engine
            .resolve_by_name(&mut session, "Pancakse", "")
            .unwrap();
        assert_eq!(engine.recipe(&result).unwrap().name, "Pancakes");
        assert!(result.score < 100.0);
    }

    #[test]
    fn test_resolve_falls_back_to_second_best() {
        let corpus = soup_corpus();
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut session = SessionState::new();

        let candidates = engine.name_candidates("chicken noodle soup");
        assert_eq!(candidates[0].index, 0);
        assert_eq!(candidates[1].index, 1);

        let result = engine
            .resolve_by_name(&mut session, "chicken noodle soup", "vegetarian")
            .unwrap();
        assert_eq!(result.index, 1);
        // carries its own score, not the best candidate's
        assert!((result.score - candidates[1].score).abs() < 0.01);
    }

    #[test]
    fn test_resolve_restriction_conflict() {
        let corpus = soup_corpus();
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut session = SessionState::new();

        let err = engine
            .resolve_by_name(&mut session, "pancakes", "vegan")
            .unwrap_err();
        assert_eq!(
            err,
            MatchError::RestrictionConflict {
                name: "Pancakes".to_string(),
                restriction: "vegan".to_string(),
            }
        );
        assert_eq!(err.kind(), "restriction_conflict");
        assert!(session.last_match().is_none());
    }

    #[test]
    fn test_resolve_not_found() {
        let corpus = soup_corpus();
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut session = SessionState::new();

        assert_eq!(
            engine.resolve_by_name(&mut session, "qqqq", ""),
            Err(MatchError::NotFound("qqqq".to_string()))
        );
        assert!(matches!(
            engine.resolve_by_name(&mut session, "   ", ""),
            Err(MatchError::NotFound(_))
        ));

        let empty = RecipeCorpus::new();
        let engine = MatchingEngine::new(&empty, &taxonomy);
        assert!(matches!(
            engine.resolve_by_name(&mut session, "pancakes", ""),
            Err(MatchError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let corpus = RecipeCorpus::load_embedded().unwrap();
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);

        let first = engine.resolve_by_name(&mut SessionState::new(), "tomato pasta", "vegan");
        for _ in 0..5 {
            let again = engine.resolve_by_name(&mut SessionState::new(), "tomato pasta", "vegan");
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_equal_scores_keep_corpus_order() {
        let corpus = RecipeCorpus::from_recipes([
            recipe("Toast", &["bread"]),
            recipe("toast", &["rye bread"]),
        ]);
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);

        let candidates = engine.name_candidates("TOAST");
        assert_eq!(
            candidates.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn test_ordinal_selection() {
        let corpus = RecipeCorpus::from_recipes(
            ["Alpha Bake", "Beta Bake", "Gamma Bake", "Delta Bake", "Epsilon Bake"]
                .into_iter()
                .map(|name| recipe(name, &["potato"])),
        );
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut session = SessionState::new();
        session.set_suggestions(
            corpus
                .recipes
                .iter()
                .enumerate()
                .map(|(index, r)| (index, r.name.clone())),
        );

        let third = engine.resolve_by_name(&mut session, " 3 ", "").unwrap();
        assert_eq!(engine.recipe(&third).unwrap().name, "Gamma Bake");

        assert_eq!(
            engine.resolve_by_name(&mut session, "9", ""),
            Err(MatchError::InvalidSelection {
                selection: "9".to_string(),
                available: 5
            })
        );
        assert!(matches!(
            engine.resolve_by_name(&mut session, "0", ""),
            Err(MatchError::InvalidSelection { .. })
        ));
        assert_eq!(
            engine.resolve_by_name(&mut session, "99999999999999999999999", ""),
            Err(MatchError::InvalidSelection {
                selection: "99999999999999999999999".to_string(),
                available: 5
            })
        );
        // signed numbers are not ordinals
        assert!(matches!(
            engine.resolve_by_name(&mut session, "+3", ""),
            Err(MatchError::NotFound(_))
        ));
        // the failed selection leaves the previous match in place
        assert_eq!(session.last_match().map(|m| m.index), Some(2));
    }

    #[test]
    fn test_ordinal_picks_the_suggested_recipe_among_duplicates() {
        let corpus = RecipeCorpus::from_recipes([
            recipe("Toast", &["bread", "butter"]),
            recipe("Toast", &["bread", "jam"]),
        ]);
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut session = SessionState::new();

        let suggestions = engine.suggest(&mut session, "bread, jam", "").unwrap();
        assert_eq!(suggestions.suggestions[0].index, 1);

        let picked = engine.resolve_by_name(&mut session, "1", "").unwrap();
        assert_eq!(picked.index, 1);
        assert!((picked.score - 100.0).abs() < f64::EPSILON);
        assert_eq!(session.last_match(), Some(&picked));
    }

    #[test]
    fn test_non_compliant_ordinal_falls_back_to_name() {
        let corpus = soup_corpus();
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut session = SessionState::new();
        session.set_suggestions([(0, "Chicken Noodle Soup".to_string())]);

        let result = engine
            .resolve_by_name(&mut session, "1", "vegetarian")
            .unwrap();
        assert_eq!(result.index, 1);
    }

    #[test]
    fn test_number_without_suggestions_is_a_name() {
        let corpus = RecipeCorpus::from_recipes([recipe("7 Layer Dip", &["beans"])]);
        let taxonomy = RestrictionTaxonomy::builtin();
        let engine = MatchingEngine::new(&corpus, &taxonomy);
        let mut session = SessionState::new();

        // "7" is scored as a name, not rejected as a selection
        let result = engine.resolve_by_name(&mut session, "7", "");
        assert!(!matches!(result, Err(MatchError::InvalidSelection { .. })));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = MatchingConfig::from_json(r#"{"suggestion_limit": 3, "coarse_floor": 20.0}"#)
            .unwrap();
        assert_eq!(config.suggestion_limit, 3);
        assert!((config.coarse_floor - 20.0).abs() < f64::EPSILON);
        assert!((config.label_threshold - DEFAULT_LABEL_THRESHOLD).abs() < f64::EPSILON);
        assert_eq!(config.name_candidates, DEFAULT_NAME_CANDIDATES);
    }

    #[test]
    fn test_custom_name_floor() {
        let corpus = soup_corpus();
        let taxonomy = RestrictionTaxonomy::builtin();
        let config = MatchingConfig {
            name_score_floor: 99.0,
            ..MatchingConfig::default()
        };
        let engine = MatchingEngine::with_config(&corpus, &taxonomy, config);
        assert!(matches!(
            engine.resolve_by_name(&mut SessionState::new(), "Pancakse", ""),
            Err(MatchError::NotFound(_))
        ));
    }
}
