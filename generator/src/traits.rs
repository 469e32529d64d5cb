//! Generator trait definitions for dependency injection

use async_trait::async_trait;
use shared::{Recipe, RecipeSources, RecipeTree};

use crate::error::GeneratorResult;
use crate::types::OracleResponse;

/// Recipe and item storage consumed by the generator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Given `left` and a list of right items, return the right items that do
    /// NOT have a known combination with `left`. Never mutates the store.
    async fn missing_recipes(&self, left: &str, candidates: &[String]) -> GeneratorResult<Vec<String>>;

    /// Add a recipe. Fails with `ItemNotFound` when either source is unknown.
    async fn add_recipe(&self, recipe: &Recipe) -> GeneratorResult<()>;

    /// All source pairs known to produce `item`
    async fn list_recipes(&self, item: &str) -> GeneratorResult<Vec<RecipeSources>>;

    /// Item names containing `query`, case-insensitive, at most `max` of them
    async fn items_like(&self, query: &str, max: usize) -> GeneratorResult<Vec<String>>;

    /// How `item` is made, expanded through known recipes down to base items.
    /// Fails with `ItemNotFound` when the item is unknown.
    async fn recipe_tree(&self, item: &str) -> GeneratorResult<RecipeTree>;
}

/// External service that combines two items into one
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Ask what `first + second` produces. One call is one external query.
    async fn combine(&self, first: &str, second: &str) -> GeneratorResult<OracleResponse>;
}
