//! Core data types for recipe lookup.
//!
//! - [`Recipe`]: A corpus entry with normalized ingredients and steps
//! - [`Confidence`]: Classification of a name-match score
//!
//! Ingredients are stored lowercase and trimmed. Each recipe also carries
//! its ingredients joined into a single text blob, which is what ingredient
//! queries are scored against.
//!
//! [`Recipe`]: recipe::Recipe
//! [`Confidence`]: types::Confidence

pub mod recipe;
pub mod types;
