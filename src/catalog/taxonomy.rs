use serde::Serialize;

use crate::matching::scoring::Similarity;

/// Ingredients excluded by a vegetarian diet, shared by vegan
const MEAT_AND_FISH: &[&str] = &[
    "meat",
    "chicken",
    "beef",
    "pork",
    "lamb",
    "bacon",
    "ham",
    "turkey",
    "sausage",
    "prosciutto",
    "fish",
    "salmon",
    "tuna",
    "shrimp",
    "anchovy",
    "gelatin",
];

const MEAT_ONLY: &[&str] = &[
    "meat",
    "chicken",
    "beef",
    "pork",
    "lamb",
    "bacon",
    "ham",
    "turkey",
    "sausage",
    "prosciutto",
];

const DAIRY: &[&str] = &["milk", "cheese", "butter", "cream", "yogurt"];

const ANIMAL_PRODUCTS: &[&str] = &["egg", "honey", "mayonnaise"];

const GLUTEN: &[&str] = &[
    "wheat",
    "flour",
    "bread",
    "pasta",
    "spaghetti",
    "noodle",
    "barley",
    "rye",
    "couscous",
];

const NOT_HALAL: &[&str] = &[
    "pork",
    "bacon",
    "ham",
    "lard",
    "prosciutto",
    "gelatin",
    "wine",
    "beer",
    "rum",
];

const NOT_KOSHER: &[&str] = &[
    "pork",
    "bacon",
    "ham",
    "lard",
    "prosciutto",
    "shrimp",
    "lobster",
    "crab",
    "clam",
    "oyster",
];

const NUTS: &[&str] = &[
    "peanut",
    "almond",
    "walnut",
    "cashew",
    "pecan",
    "hazelnut",
    "pistachio",
];

/// A dietary restriction and the ingredient substrings it forbids
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestrictionEntry {
    /// Canonical lowercase label (e.g. `vegan`, `gluten-free`)
    pub label: String,
    /// Forbidden ingredient substrings
    pub forbidden: Vec<String>,
}

impl RestrictionEntry {
    pub fn new(label: impl Into<String>, forbidden: &[&str]) -> Self {
        Self {
            label: label.into().to_lowercase(),
            forbidden: forbidden.iter().map(|f| f.to_lowercase()).collect(),
        }
    }
}

/// Ordered mapping from restriction label to forbidden ingredients.
///
/// Lookups by a noisy label score the label against every entry and keep the
/// best one; on equal scores the earlier entry wins.
#[derive(Debug, Clone)]
pub struct RestrictionTaxonomy {
    entries: Vec<RestrictionEntry>,
}

impl RestrictionTaxonomy {
    /// The taxonomy compiled into the engine
    #[must_use]
    pub fn builtin() -> Self {
        let vegan: Vec<&str> = MEAT_AND_FISH
            .iter()
            .chain(DAIRY)
            .chain(ANIMAL_PRODUCTS)
            .copied()
            .collect();

        Self::from_entries(vec![
            RestrictionEntry::new("vegetarian", MEAT_AND_FISH),
            RestrictionEntry::new("vegan", &vegan),
            RestrictionEntry::new("pescatarian", MEAT_ONLY),
            RestrictionEntry::new("halal", NOT_HALAL),
            RestrictionEntry::new("kosher", NOT_KOSHER),
            RestrictionEntry::new("gluten-free", GLUTEN),
            RestrictionEntry::new("dairy-free", DAIRY),
            RestrictionEntry::new("nut-free", NUTS),
        ])
    }

    #[must_use]
    pub fn from_entries(entries: Vec<RestrictionEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[RestrictionEntry] {
        &self.entries
    }

    /// Exact lookup by canonical label
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&RestrictionEntry> {
        let label = label.trim().to_lowercase();
        self.entries.iter().find(|e| e.label == label)
    }

    /// Resolve a possibly misspelled label to the best entry scoring at least `threshold`.
    ///
    /// Returns the entry together with its score.
    pub fn resolve<S: Similarity + ?Sized>(
        &self,
        token: &str,
        scorer: &S,
        threshold: f64,
    ) -> Option<(&RestrictionEntry, f64)> {
        let mut best: Option<(&RestrictionEntry, f64)> = None;
        for entry in &self.entries {
            let score = scorer.ratio(token, &entry.label);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((entry, score));
            }
        }
        best.filter(|&(_, score)| score >= threshold)
    }
}

impl Default for RestrictionTaxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}
