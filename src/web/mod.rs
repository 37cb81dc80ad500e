//! JSON API for recipe lookup with per-conversation sessions.
//!
//! Each client creates a session and then issues find and suggest requests
//! against it. Sessions are isolated: ordinal selection and "the current
//! recipe" only ever refer to the caller's own earlier requests.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! recipe-finder serve
//!
//! # Custom port and corpus
//! recipe-finder serve --port 3000 --corpus my_recipes.csv
//!
//! # Bind to all interfaces
//! recipe-finder serve --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /api/health` - Liveness and corpus size
//! - `GET /api/corpus` - List all recipe names
//! - `POST /api/sessions` - Start a session
//! - `DELETE /api/sessions/{id}` - End a session
//! - `POST /api/sessions/{id}/find` - Resolve a recipe name (`{"name", "restriction"}`)
//! - `POST /api/sessions/{id}/suggest` - Suggest recipes (`{"ingredients", "restriction"}`)
//! - `GET /api/sessions/{id}/recipe` - Ingredients and steps of the current recipe

pub mod server;
