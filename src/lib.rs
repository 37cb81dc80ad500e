//! # recipe-finder
//!
//! A library for finding recipes by fuzzy name and by available ingredients,
//! while honoring dietary restrictions.
//!
//! Recipe names typed by people are often misspelled ("pancakse") or
//! approximate ("chicken noodle soup" when the corpus has a vegetarian
//! variant), and restrictions arrive as free text ("vegen and gluten free").
//! `recipe-finder` scores everything fuzzily, so typos still resolve and
//! restrictions still apply.
//!
//! ## Features
//!
//! - **Fuzzy name lookup**: best-scoring names are tried in order until one complies
//! - **Ingredient suggestions**: two-pass retrieval ranked by score and missing ingredients
//! - **Dietary compliance**: misspelled restriction labels and ingredient variants are matched
//! - **Conversation state**: ordinal selection ("3") from the last suggestion round
//! - **Lenient corpora**: JSON or CSV, with list fields as lists, literals or plain text
//!
//! ## Example
//!
//! ```rust
//! use recipe_finder::{MatchingEngine, RecipeCorpus, RestrictionTaxonomy, SessionState};
//!
//! let corpus = RecipeCorpus::load_embedded().unwrap();
//! let taxonomy = RestrictionTaxonomy::builtin();
//! let engine = MatchingEngine::new(&corpus, &taxonomy);
//!
//! // Each conversation owns its own session
//! let mut session = SessionState::new();
//! match engine.resolve_by_name(&mut session, "pancakse", "") {
//!     Ok(found) => println!("{} ({})", corpus.recipes[found.index].name, found.confidence()),
//!     Err(e) => println!("{e}"),
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Recipe corpus storage and restriction taxonomy
//! - [`core`]: Core data types for recipes
//! - [`matching`]: Matching engine, compliance filter and similarity scores
//! - [`parsing`]: Lenient parsers for list fields and CSV corpora
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: JSON API with per-conversation sessions

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use catalog::store::RecipeCorpus;
pub use catalog::taxonomy::RestrictionTaxonomy;
pub use core::recipe::Recipe;
pub use core::types::*;
pub use matching::engine::{MatchError, MatchResult, MatchingConfig, MatchingEngine};
pub use matching::session::SessionState;
pub use matching::suggest::{Suggestion, SuggestionRound};
