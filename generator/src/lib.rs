//! Recipe generator library
//!
//! Pairs every known item with every other, skips pairs whose result is
//! already on record, asks a rate-limited combination oracle about the rest
//! and collects the recipes it returns along with the items it reports as
//! brand new.

pub mod config;
pub mod core;
pub mod error;
pub mod input;
pub mod services;
pub mod traits;
pub mod types;

// Re-export main types
pub use crate::config::{FailurePolicy, GeneratorConfig};
pub use crate::core::{
    DedupFilter, DiscoveryAggregator, Generator, GeneratorBuilder, PairEnumerator, RateLimitedOracle, RateLimiter,
};
pub use crate::error::{GeneratorError, GeneratorResult};
pub use crate::services::{HttpOracle, MemoryRecipeStore};
pub use crate::traits::*;
pub use crate::types::*;
pub use shared::{Recipe, RecipeSources, RecipeTree, RunId};
