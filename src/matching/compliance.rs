use serde::Serialize;

use crate::catalog::taxonomy::{RestrictionEntry, RestrictionTaxonomy};
use crate::core::recipe::Recipe;
use crate::matching::scoring::Similarity;

/// Restriction strings meaning "no restriction at all"
pub const NO_RESTRICTION_SENTINELS: &[&str] = &[
    "none",
    "no",
    "nothing",
    "no restriction",
    "no restrictions",
    "n/a",
];

/// Minimum label similarity for a restriction word to count as a known restriction
pub const DEFAULT_LABEL_THRESHOLD: f64 = 75.0;

/// Minimum partial similarity for an ingredient to count as a forbidden one
pub const DEFAULT_CONTAINMENT_THRESHOLD: f64 = 70.0;

/// Split a raw restriction string into lowercase tokens.
///
/// Commas and the standalone word `and` separate restrictions; empty and
/// repeated tokens are dropped, and the sentinels in
/// [`NO_RESTRICTION_SENTINELS`] yield no tokens at all.
///
/// # Examples
///
/// ```
/// use recipe_finder::matching::compliance::parse_restrictions;
///
/// assert_eq!(
///     parse_restrictions("Vegan and gluten free, halal"),
///     vec!["vegan", "gluten free", "halal"]
/// );
/// assert!(parse_restrictions("none").is_empty());
/// ```
#[must_use]
pub fn parse_restrictions(restriction: &str) -> Vec<String> {
    let restriction = restriction.trim().to_lowercase();
    if restriction.is_empty() || NO_RESTRICTION_SENTINELS.contains(&restriction.as_str()) {
        return Vec::new();
    }

    let mut tokens: Vec<String> = Vec::new();
    for piece in restriction.split(',') {
        let mut current: Vec<&str> = Vec::new();
        for word in piece.split_whitespace().chain(std::iter::once("and")) {
            if word == "and" {
                let token = current.join(" ");
                if !token.is_empty() && !tokens.contains(&token) {
                    tokens.push(token);
                }
                current.clear();
            } else {
                current.push(word);
            }
        }
    }
    tokens
}

/// A forbidden ingredient found in a recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Restriction label that forbids the ingredient
    pub restriction: String,
    /// Forbidden term from the taxonomy
    pub forbidden: String,
    /// Recipe ingredient that matched the term
    pub ingredient: String,
}

/// Decides whether recipes and ingredients are compatible with dietary restrictions.
///
/// Restriction words are matched against taxonomy labels with
/// [`Similarity::ratio`]; words that match no label are ignored. Ingredients are
/// matched against forbidden terms with [`Similarity::partial_ratio`], so
/// "cheddar cheese" is caught by the term "cheese".
pub struct ComplianceFilter<'a, S: Similarity + ?Sized> {
    taxonomy: &'a RestrictionTaxonomy,
    scorer: &'a S,
    label_threshold: f64,
    containment_threshold: f64,
}

impl<'a, S: Similarity + ?Sized> ComplianceFilter<'a, S> {
    pub fn new(taxonomy: &'a RestrictionTaxonomy, scorer: &'a S) -> Self {
        Self {
            taxonomy,
            scorer,
            label_threshold: DEFAULT_LABEL_THRESHOLD,
            containment_threshold: DEFAULT_CONTAINMENT_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_thresholds(mut self, label_threshold: f64, containment_threshold: f64) -> Self {
        self.label_threshold = label_threshold;
        self.containment_threshold = containment_threshold;
        self
    }

    /// Taxonomy entries recognized in a raw restriction string, in order, without repeats
    #[must_use]
    pub fn resolve_restrictions(&self, restriction: &str) -> Vec<&'a RestrictionEntry> {
        let mut entries: Vec<&'a RestrictionEntry> = Vec::new();
        for token in parse_restrictions(restriction) {
            match self
                .taxonomy
                .resolve(&token, self.scorer, self.label_threshold)
            {
                Some((entry, score)) => {
                    tracing::debug!(
                        "Restriction '{token}' resolved to '{}' ({score:.1})",
                        entry.label
                    );
                    if !entries.iter().any(|e| e.label == entry.label) {
                        entries.push(entry);
                    }
                }
                None => tracing::debug!("Ignoring unrecognized restriction '{token}'"),
            }
        }
        entries
    }

    /// Does `recipe` satisfy every recognized restriction in `restriction`?
    ///
    /// An empty or "none" restriction always passes, as do restrictions whose words match no
    /// known restriction.
    #[must_use]
    pub fn complies(&self, recipe: &Recipe, restriction: &str) -> bool {
        self.complies_with(recipe, &self.resolve_restrictions(restriction))
    }

    /// [`ComplianceFilter::complies`] against already resolved restrictions
    #[must_use]
    pub fn complies_with(&self, recipe: &Recipe, entries: &[&RestrictionEntry]) -> bool {
        entries.iter().all(|entry| {
            entry.forbidden.iter().all(|forbidden| {
                self.matching_ingredient(forbidden, &recipe.ingredients)
                    .is_none()
            })
        })
    }

    /// Every forbidden ingredient in `recipe` under `restriction`.
    ///
    /// Empty exactly when [`ComplianceFilter::complies`] is true.
    #[must_use]
    pub fn violations(&self, recipe: &Recipe, restriction: &str) -> Vec<Violation> {
        let mut violations = Vec::new();
        for entry in self.resolve_restrictions(restriction) {
            for forbidden in &entry.forbidden {
                for ingredient in &recipe.ingredients {
                    if self.contains(forbidden, ingredient) {
                        violations.push(Violation {
                            restriction: entry.label.clone(),
                            forbidden: forbidden.clone(),
                            ingredient: ingredient.clone(),
                        });
                    }
                }
            }
        }
        violations
    }

    /// Is a single ingredient forbidden by any of the given restrictions?
    #[must_use]
    pub fn is_forbidden(&self, ingredient: &str, entries: &[&RestrictionEntry]) -> bool {
        entries.iter().any(|entry| {
            entry
                .forbidden
                .iter()
                .any(|forbidden| self.contains(forbidden, ingredient))
        })
    }

    fn matching_ingredient<'r>(&self, forbidden: &str, ingredients: &'r [String]) -> Option<&'r str> {
        ingredients
            .iter()
            .find(|ingredient| self.contains(forbidden, ingredient))
            .map(String::as_str)
    }

    fn contains(&self, forbidden: &str, ingredient: &str) -> bool {
        self.scorer.partial_ratio(forbidden, ingredient) >= self.containment_threshold
    }
}
