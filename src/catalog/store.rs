use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::recipe::Recipe;
use crate::parsing::fields::{parse_list_field, Delimiter};
use crate::utils::validation::check_recipe_limit;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Failed to read corpus: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse corpus: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to parse CSV corpus: {0}")]
    CsvError(#[from] csv::Error),

    #[error("CSV corpus is missing a {0} column")]
    MissingColumn(&'static str),

    #[error("{0}")]
    TooManyRecipes(String),
}

/// Corpus format version for compatibility checking
pub const CORPUS_VERSION: &str = "1.0.0";

/// A list-valued field as stored on disk: either a real list or raw text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    List(Vec<String>),
    Text(String),
}

impl Default for RawField {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl RawField {
    /// Resolve into items, parsing text best-effort
    #[must_use]
    pub fn into_items(self, delimiter: Delimiter) -> Vec<String> {
        match self {
            Self::List(items) => items,
            Self::Text(text) => {
                let parsed = parse_list_field(&text, delimiter);
                if parsed.is_fallback() && text.trim_start().starts_with('[') {
                    tracing::warn!("Recovered malformed list field by delimiter splitting");
                }
                parsed.into_items()
            }
        }
    }
}

/// One recipe as stored in a corpus file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub name: String,
    #[serde(default)]
    pub ingredients: RawField,
    #[serde(default)]
    pub steps: RawField,
}

impl RecipeRecord {
    /// Normalize into a [`Recipe`]; `None` when the record has no name
    #[must_use]
    pub fn into_recipe(self) -> Option<Recipe> {
        if self.name.trim().is_empty() {
            return None;
        }
        Some(Recipe::new(
            self.name,
            self.ingredients.into_items(Delimiter::Comma),
            self.steps.into_items(Delimiter::Line),
        ))
    }
}

impl From<&Recipe> for RecipeRecord {
    fn from(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            ingredients: RawField::List(recipe.ingredients.clone()),
            steps: RawField::List(recipe.steps.clone()),
        }
    }
}

/// Serializable corpus format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusData {
    pub version: String,
    #[serde(default)]
    pub created_at: String,
    pub recipes: Vec<RecipeRecord>,
}

/// The immutable recipe corpus with a name index
#[derive(Debug)]
pub struct RecipeCorpus {
    /// All recipes; a recipe's identity is its index here
    pub recipes: Vec<Recipe>,

    /// Index: lowercase name -> first index with that name
    name_to_index: HashMap<String, usize>,
}

impl RecipeCorpus {
    /// Create an empty corpus
    pub fn new() -> Self {
        Self {
            recipes: Vec::new(),
            name_to_index: HashMap::new(),
        }
    }

    /// Build a corpus from already-normalized recipes
    pub fn from_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let mut corpus = Self::new();
        for recipe in recipes {
            corpus.add_recipe(recipe);
        }
        corpus
    }

    /// Load the embedded default corpus
    pub fn load_embedded() -> Result<Self, CorpusError> {
        // Validated at compile time via build.rs
        const EMBEDDED_CORPUS: &str = include_str!("../../corpus/recipes.json");
        Self::from_json(EMBEDDED_CORPUS)
    }

    /// Load a corpus file, choosing the format by extension (`.csv` or JSON)
    pub fn load_from_file(path: &Path) -> Result<Self, CorpusError> {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

        if is_csv {
            let file = std::fs::File::open(path)?;
            Self::from_records(crate::parsing::csv::read_records(file)?)
        } else {
            let content = std::fs::read_to_string(path)?;
            Self::from_json(&content)
        }
    }

    /// Parse corpus from JSON string
    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        let data: CorpusData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != CORPUS_VERSION {
            tracing::warn!(
                "Corpus version mismatch (expected {}, found {})",
                CORPUS_VERSION,
                data.version
            );
        }

        Self::from_records(data.recipes)
    }

    /// Normalize raw records into a corpus, skipping nameless records
    pub fn from_records(
        records: impl IntoIterator<Item = RecipeRecord>,
    ) -> Result<Self, CorpusError> {
        let mut corpus = Self::new();
        let mut skipped = 0usize;

        for record in records {
            if let Some(message) = check_recipe_limit(corpus.len()) {
                return Err(CorpusError::TooManyRecipes(message));
            }
            match record.into_recipe() {
                Some(recipe) => corpus.add_recipe(recipe),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::warn!("Skipped {skipped} corpus record(s) without a name");
        }
        tracing::debug!("Loaded corpus with {} recipes", corpus.len());

        Ok(corpus)
    }

    /// Add a recipe to the corpus
    pub fn add_recipe(&mut self, recipe: Recipe) {
        let index = self.recipes.len();
        self.name_to_index.entry(recipe.key()).or_insert(index);
        self.recipes.push(recipe);
    }

    /// Get a recipe by its corpus index
    pub fn get(&self, index: usize) -> Option<&Recipe> {
        self.recipes.get(index)
    }

    /// Exact, case-insensitive lookup by name
    pub fn find_by_name(&self, name: &str) -> Option<(usize, &Recipe)> {
        self.name_to_index
            .get(&name.trim().to_lowercase())
            .map(|&idx| (idx, &self.recipes[idx]))
    }

    /// Export corpus to JSON
    pub fn to_json(&self) -> Result<String, CorpusError> {
        let data = CorpusData {
            version: CORPUS_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            recipes: self.recipes.iter().map(RecipeRecord::from).collect(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Number of recipes in corpus
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Check if corpus is empty
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl Default for RecipeCorpus {
    fn default() -> Self {
        Self::new()
    }
}
