//! Filters out pairs the recipe store already knows

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use crate::error::{GeneratorError, GeneratorResult};
use crate::traits::RecipeStore;

/// Narrows a task's candidates down to pairs with no known recipe
pub struct DedupFilter<S: RecipeStore> {
    store: Arc<S>,
}

impl<S: RecipeStore> Clone for DedupFilter<S> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone() }
    }
}

impl<S: RecipeStore> DedupFilter<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Candidates whose pair with `left` is unknown, in input order.
    ///
    /// Always a subset of `candidates`; anything else the store returns is dropped.
    pub async fn missing(&self, left: &str, candidates: &[String]) -> GeneratorResult<Vec<String>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let reported = self
            .store
            .missing_recipes(left, candidates)
            .await
            .map_err(|e| match e {
                GeneratorError::StoreUnavailable { message } => {
                    GeneratorError::store_unavailable(format!("checking pairs for '{left}': {message}"))
                }
                other => other,
            })?;

        let reported: HashSet<&str> = reported.iter().map(String::as_str).collect();
        let missing: Vec<String> = candidates
            .iter()
            .filter(|candidate| reported.contains(candidate.as_str()))
            .cloned()
            .collect();

        let known: HashSet<&str> = candidates.iter().map(String::as_str).collect();
        let stray = reported.iter().filter(|name| !known.contains(*name)).count();
        if stray > 0 {
            warn!(left = %left, stray, "Recipe store returned items that were not asked about");
        }

        Ok(missing)
    }
}
