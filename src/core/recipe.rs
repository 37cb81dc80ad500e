use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Separator used to join ingredients into [`Recipe::ingredients_text`]
pub const INGREDIENT_SEPARATOR: &str = ", ";

/// A recipe in the corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Display name, also the (case-insensitive) lookup key
    pub name: String,

    /// Normalized lowercase ingredients, in source order
    pub ingredients: Vec<String>,

    /// Instruction steps, in order
    #[serde(default)]
    pub steps: Vec<String>,

    // === Pre-computed for fast matching (populated on construction) ===
    /// Lowercase ingredients joined by [`INGREDIENT_SEPARATOR`]
    #[serde(skip)]
    pub ingredients_text: String,
}

impl Recipe {
    pub fn new(
        name: impl Into<String>,
        ingredients: impl IntoIterator<Item = impl AsRef<str>>,
        steps: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut recipe = Self {
            name: name.into().trim().to_string(),
            ingredients: ingredients
                .into_iter()
                .filter_map(|i| normalize_ingredient(i.as_ref()))
                .collect(),
            steps: steps
                .into_iter()
                .map(Into::into)
                .map(|s: String| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            ingredients_text: String::new(),
        };
        recipe.rebuild_text();
        recipe
    }

    /// Rebuild [`Recipe::ingredients_text`] after deserializing
    pub fn rebuild_text(&mut self) {
        self.ingredients_text = self.ingredients.join(INGREDIENT_SEPARATOR);
    }

    /// Lowercase name used for case-insensitive comparisons
    #[must_use]
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Ingredients of this recipe that are not in `have`
    #[must_use]
    #[allow(clippy::implicit_hasher)]
    pub fn missing_from<'a>(&'a self, have: &HashSet<&str>) -> Vec<&'a str> {
        let mut seen: HashSet<&str> = HashSet::new();
        self.ingredients
            .iter()
            .map(String::as_str)
            .filter(|i| !have.contains(*i) && seen.insert(*i))
            .collect()
    }
}

/// Lowercase and trim an ingredient; `None` when nothing is left
#[must_use]
pub fn normalize_ingredient(raw: &str) -> Option<String> {
    let trimmed = raw.trim().to_lowercase();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_ingredients() {
        let recipe = Recipe::new(
            "  Veggie Stew ",
            ["Carrot", " potato ", "", "Chicken Broth"],
            ["Chop.", "  ", "Simmer."],
        );
        assert_eq!(recipe.name, "Veggie Stew");
        assert_eq!(recipe.ingredients, vec!["carrot", "potato", "chicken broth"]);
        assert_eq!(recipe.ingredients_text, "carrot, potato, chicken broth");
        assert_eq!(recipe.steps, vec!["Chop.", "Simmer."]);
        assert_eq!(recipe.key(), "veggie stew");
    }

    #[test]
    fn test_missing_from_counts_each_ingredient_once() {
        let recipe = Recipe::new(
            "Salad",
            ["tomato", "basil", "tomato", "mozzarella"],
            Vec::<String>::new(),
        );
        let have: HashSet<&str> = ["tomato"].into_iter().collect();
        assert_eq!(recipe.missing_from(&have), vec!["basil", "mozzarella"]);
    }

    #[test]
    fn test_rebuild_text_after_deserialize() {
        let mut recipe: Recipe =
            serde_json::from_str(r#"{"name":"Toast","ingredients":["bread","butter"]}"#).unwrap();
        assert!(recipe.ingredients_text.is_empty());
        recipe.rebuild_text();
        assert_eq!(recipe.ingredients_text, "bread, butter");
        assert!(recipe.steps.is_empty());
    }
}
