//! Command-line interface for recipe-finder.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **find**: Resolve a (possibly misspelled) recipe name under restrictions
//! - **suggest**: Suggest recipes for a list of ingredients
//! - **corpus**: List, show, or export recipes from the corpus
//! - **session**: Interactive line-oriented conversation over stdin
//! - **serve**: Start the JSON API server
//!
//! ## Usage
//!
//! ```text
//! # Find a recipe, tolerating typos
//! recipe-finder find "pancakse"
//!
//! # Respect dietary restrictions
//! recipe-finder find "chicken noodle soup" -r vegetarian --steps
//!
//! # Suggest recipes from what is in the fridge
//! recipe-finder suggest "tomato, basil, garlic" -r "vegan, gluten-free"
//!
//! # JSON output for scripting
//! recipe-finder suggest "rice, egg" --format json
//!
//! # Use a custom CSV corpus
//! recipe-finder corpus list --corpus my_recipes.csv
//!
//! # Start the API
//! recipe-finder serve --port 8080
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::catalog::store::RecipeCorpus;
use crate::matching::engine::MatchingConfig;

pub mod corpus;
pub mod find;
pub mod session;
pub mod suggest;

#[derive(Parser)]
#[command(name = "recipe-finder")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Find recipes by fuzzy name or by ingredients, honoring dietary restrictions")]
#[command(
    long_about = "recipe-finder resolves misspelled recipe names and suggests recipes from a list of ingredients.\n\nDietary restrictions are given as free text (\"vegan and gluten free\") and are matched fuzzily:\n- Misspelled restriction labels still apply\n- Ingredient variants (\"cheddar cheese\") are caught by their base term\n- Unknown restriction words are ignored"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find a recipe by name
    Find(find::FindArgs),

    /// Suggest recipes for a list of ingredients
    Suggest(suggest::SuggestArgs),

    /// Inspect the recipe corpus
    Corpus(corpus::CorpusArgs),

    /// Run an interactive session over stdin
    Session(session::SessionArgs),

    /// Start the web server
    Serve(ServeArgs),
}

/// Where recipes and thresholds come from
#[derive(clap::Args, Clone, Debug, Default)]
pub struct SourceArgs {
    /// Path to a custom corpus file (JSON or CSV)
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Path to a JSON file overriding matching thresholds
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl SourceArgs {
    /// Load the corpus, falling back to the embedded one
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus file cannot be read or parsed.
    pub fn load_corpus(&self) -> anyhow::Result<RecipeCorpus> {
        let corpus = match &self.corpus {
            Some(path) => RecipeCorpus::load_from_file(path)
                .with_context(|| format!("Failed to load corpus from {}", path.display()))?,
            None => RecipeCorpus::load_embedded()?,
        };
        tracing::debug!("Loaded corpus with {} recipes", corpus.len());
        Ok(corpus)
    }

    /// Load matching thresholds, falling back to the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn load_config(&self) -> anyhow::Result<MatchingConfig> {
        let Some(path) = &self.config else {
            return Ok(MatchingConfig::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        MatchingConfig::from_json(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Structured form of a match failure for JSON output
pub(crate) fn error_json(error: &crate::matching::engine::MatchError) -> serde_json::Value {
    serde_json::json!({
        "error": error.to_string(),
        "error_type": error.kind(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_defaults_without_file() {
        let config = SourceArgs::default().load_config().unwrap();
        assert_eq!(config.suggestion_limit, 5);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name_candidates": 3}}"#).unwrap();
        let args = SourceArgs {
            corpus: None,
            config: Some(file.path().to_path_buf()),
        };
        assert_eq!(args.load_config().unwrap().name_candidates, 3);
    }

    #[test]
    fn test_load_missing_corpus_fails() {
        let args = SourceArgs {
            corpus: Some(PathBuf::from("/nonexistent/recipes.json")),
            config: None,
        };
        assert!(args.load_corpus().is_err());
    }
}
