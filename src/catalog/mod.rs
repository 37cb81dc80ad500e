//! Recipe corpus storage and the dietary restriction taxonomy.
//!
//! The corpus is the immutable list of known recipes. An embedded corpus is
//! compiled into the binary, but corpora can also be loaded from JSON or CSV
//! files. Ingredient and step fields may be real lists, list-literal strings
//! (`"['flour', 'milk']"`) or plain delimited text; all three load the same way.
//!
//! ## Example
//!
//! ```rust,no_run
//! use recipe_finder::RecipeCorpus;
//! use std::path::Path;
//!
//! // Load embedded corpus
//! let corpus = RecipeCorpus::load_embedded().unwrap();
//! for recipe in &corpus.recipes {
//!     println!("{}: {}", recipe.name, recipe.ingredients_text);
//! }
//!
//! // Export to JSON, or load a custom file
//! let json = corpus.to_json().unwrap();
//! let custom = RecipeCorpus::load_from_file(Path::new("my_recipes.csv")).unwrap();
//! ```
//!
//! The [`taxonomy::RestrictionTaxonomy`] maps restriction labels such as
//! `vegan` or `gluten-free` to the ingredient terms they forbid.

pub mod store;
pub mod taxonomy;
