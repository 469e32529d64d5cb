//! Shared types for the recipe discovery system
//!
//! Contains the recipe data model and logging setup used by the generator
//! and by anything that consumes its results (web front end, importers).

pub mod types;
pub mod errors;
pub mod logging;

pub use types::*;
pub use errors::*;
