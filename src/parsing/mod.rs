//! Parsers for recipe corpus files.
//!
//! - **List fields**: ingredient and step cells stored as list literals
//!   (`['flour', 'milk']`) or delimited text, parsed best-effort
//! - **CSV corpora**: tabular exports with a header row
//!
//! ## Example
//!
//! ```rust
//! use recipe_finder::parsing::fields::{parse_list_field, Delimiter};
//!
//! let parsed = parse_list_field("['flour', 'milk']", Delimiter::Comma);
//! assert_eq!(parsed.items(), ["flour", "milk"]);
//!
//! // Malformed literals degrade to delimiter splitting
//! let parsed = parse_list_field("['flour', 'milk'", Delimiter::Comma);
//! assert!(parsed.is_fallback());
//! ```
//!
//! ## Recognized CSV columns
//!
//! | Column | Accepted headers | Required |
//! |--------|------------------|----------|
//! | Name | `name`, `title`, `recipe` | Yes |
//! | Ingredients | `ingredients`, `ner` | Yes |
//! | Steps | `steps`, `directions`, `instructions` | No |

pub mod csv;
pub mod fields;
