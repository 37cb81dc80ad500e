use serde::Serialize;
use std::collections::HashSet;

use crate::core::recipe::{normalize_ingredient, INGREDIENT_SEPARATOR};
use crate::matching::engine::{MatchError, MatchingEngine};
use crate::matching::scoring::Similarity;
use crate::matching::session::SessionState;

/// A recipe proposed for a set of ingredients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// Index of the recipe in the corpus
    pub index: usize,
    /// Refined ingredient similarity in `[0, 100]`
    pub score: f64,
    /// Number of distinct recipe ingredients the user did not list
    pub missing_count: usize,
    /// Those ingredients, in recipe order
    pub missing_ingredients: Vec<String>,
}

/// User ingredients split into those kept for matching and those dropped by restrictions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedIngredients {
    pub kept: Vec<String>,
    pub excluded: Vec<String>,
}

impl PreparedIngredients {
    /// Kept ingredients joined the same way as [`crate::core::recipe::Recipe::ingredients_text`]
    #[must_use]
    pub fn text(&self) -> String {
        self.kept.join(INGREDIENT_SEPARATOR)
    }
}

/// Outcome of a suggestion round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionRound {
    /// Recipes best first
    pub suggestions: Vec<Suggestion>,
    /// The ingredients that were matched and those dropped by restrictions
    pub ingredients: PreparedIngredients,
}

/// Split comma-separated ingredients, normalizing and dropping empty and repeated ones
///
/// # Examples
///
/// ```
/// use recipe_finder::matching::suggest::split_ingredients;
///
/// assert_eq!(
///     split_ingredients(" Tomato, basil,, TOMATO "),
///     vec!["tomato", "basil"]
/// );
/// ```
#[must_use]
pub fn split_ingredients(raw: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in raw.split(',').filter_map(normalize_ingredient) {
        if !items.contains(&item) {
            items.push(item);
        }
    }
    items
}

impl<'a, S: Similarity> MatchingEngine<'a, S> {
    /// Split the user's ingredients and drop those forbidden by `restriction`.
    ///
    /// # Errors
    ///
    /// - `EmptyInput` if no ingredient remains after splitting
    /// - `AllIngredientsExcluded` if every ingredient is forbidden
    pub fn prepare_ingredients(
        &self,
        raw: &str,
        restriction: &str,
    ) -> Result<PreparedIngredients, MatchError> {
        let items = split_ingredients(raw);
        if items.is_empty() {
            return Err(MatchError::EmptyInput);
        }

        let filter = self.compliance();
        let entries = filter.resolve_restrictions(restriction);
        let (excluded, kept): (Vec<String>, Vec<String>) = items
            .into_iter()
            .partition(|item| filter.is_forbidden(item, &entries));

        if !excluded.is_empty() {
            tracing::debug!("Excluded ingredients: {}", excluded.join(", "));
        }
        if kept.is_empty() {
            return Err(MatchError::AllIngredientsExcluded { excluded });
        }

        Ok(PreparedIngredients { kept, excluded })
    }

    /// Suggest recipes that can be made from the given ingredients.
    ///
    /// Retrieval runs in two passes: a cheap weighted score over every recipe
    /// keeps the most promising candidates, then compliant candidates are
    /// rescored by word overlap and containment. Results are ordered by score,
    /// then by fewer missing ingredients, then by corpus order.
    ///
    /// On success the suggested recipes are stored in `session` for ordinal
    /// selection and the previously matched recipe is forgotten. On error the
    /// session is left untouched.
    ///
    /// # Errors
    ///
    /// - `EmptyInput` / `AllIngredientsExcluded` from [`Self::prepare_ingredients`]
    /// - `NoSuggestionsMatched` if no recipe scores high enough
    pub fn suggest(
        &self,
        session: &mut SessionState,
        raw: &str,
        restriction: &str,
    ) -> Result<SuggestionRound, MatchError> {
        let ingredients = self.prepare_ingredients(raw, restriction)?;
        let suggestions = self.rank_ingredients(&ingredients, restriction);

        if suggestions.is_empty() {
            return Err(MatchError::NoSuggestionsMatched);
        }

        session.set_suggestions(
            suggestions
                .iter()
                .map(|s| (s.index, self.corpus.recipes[s.index].name.clone())),
        );
        session.clear_last_match();
        Ok(SuggestionRound {
            suggestions,
            ingredients,
        })
    }

    fn rank_ingredients(&self, prepared: &PreparedIngredients, restriction: &str) -> Vec<Suggestion> {
        let user_text = prepared.text();
        let have: HashSet<&str> = prepared.kept.iter().map(String::as_str).collect();

        // Coarse pass over the whole corpus
        let mut coarse: Vec<(usize, f64)> = self
            .corpus
            .recipes
            .iter()
            .enumerate()
            .map(|(idx, recipe)| (idx, self.scorer.weighted_ratio(&user_text, &recipe.ingredients_text)))
            .filter(|&(_, score)| score >= self.config.coarse_floor)
            .collect();
        coarse.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        coarse.truncate(self.config.coarse_limit);
        tracing::debug!("Coarse pass kept {} candidates", coarse.len());

        // Refinement over compliant candidates
        let filter = self.compliance();
        let entries = filter.resolve_restrictions(restriction);
        let mut refined: Vec<Suggestion> = coarse
            .into_iter()
            .filter_map(|(index, _)| {
                let recipe = &self.corpus.recipes[index];
                if !filter.complies_with(recipe, &entries) {
                    return None;
                }
                let score = self
                    .scorer
                    .token_set_ratio(&user_text, &recipe.ingredients_text)
                    .max(self.scorer.partial_ratio(&user_text, &recipe.ingredients_text));
                if score < self.config.refined_floor {
                    return None;
                }
                let missing: Vec<String> = recipe
                    .missing_from(&have)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                Some(Suggestion {
                    index,
                    score,
                    missing_count: missing.len(),
                    missing_ingredients: missing,
                })
            })
            .collect();
        tracing::debug!("Refinement kept {} candidates", refined.len());

        refined.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.missing_count.cmp(&b.missing_count))
                .then(a.index.cmp(&b.index))
        });
        refined.truncate(self.config.suggestion_limit);
        refined
    }
}
