//! Fuzzy recipe matching, dietary compliance and ingredient suggestions.
//!
//! - [`MatchingEngine`]: resolves recipe names and suggests recipes from ingredients
//! - [`ComplianceFilter`]: decides whether a recipe satisfies dietary restrictions
//! - [`SessionState`]: per-conversation memory of the last match and suggestions
//! - [`Similarity`]: the fuzzy string scores everything above is built on
//!
//! ## Name resolution
//!
//! Every recipe name is scored against the query; the best candidates are
//! tried in order and the first one satisfying the restrictions wins. A bare
//! number picks a recipe from the previous suggestion round instead.
//!
//! ## Suggestions
//!
//! 1. **Preparation**: split the ingredient list and drop forbidden ingredients
//! 2. **Coarse pass**: weighted similarity against every recipe's ingredients
//! 3. **Refinement**: drop non-compliant recipes and rescore by word overlap
//! 4. **Ranking**: score, then fewest missing ingredients, then corpus order
//!
//! ## Example
//!
//! ```rust
//! use recipe_finder::{MatchingEngine, RecipeCorpus, RestrictionTaxonomy, SessionState};
//!
//! let corpus = RecipeCorpus::load_embedded().unwrap();
//! let taxonomy = RestrictionTaxonomy::builtin();
//! let engine = MatchingEngine::new(&corpus, &taxonomy);
//! let mut session = SessionState::new();
//!
//! let found = engine
//!     .resolve_by_name(&mut session, "veggie stew", "")
//!     .unwrap();
//! assert_eq!(corpus.recipes[found.index].name, "Veggie Stew");
//!
//! if let Ok(round) = engine.suggest(&mut session, "tomato, basil", "vegan") {
//!     for s in &round.suggestions {
//!         println!("{} ({:.0})", corpus.recipes[s.index].name, s.score);
//!     }
//! }
//! ```

pub mod compliance;
pub mod engine;
pub mod scoring;
pub mod session;
pub mod suggest;

pub use compliance::ComplianceFilter;
pub use engine::{MatchError, MatchResult, MatchingConfig, MatchingEngine};
pub use scoring::{Levenshtein, Similarity};
pub use session::SessionState;
pub use suggest::{Suggestion, SuggestionRound};
