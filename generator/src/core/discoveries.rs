//! Collects the recipes and discoveries of one generation run

use shared::Recipe;
use tokio::sync::Mutex;

use crate::types::{DiscoverySet, PairFailure};

#[derive(Debug, Default)]
struct Collected {
    recipes: Vec<Recipe>,
    discoveries: DiscoverySet,
    failures: Vec<PairFailure>,
}

/// Run output shared by all workers.
///
/// Recipes and discoveries sit behind one lock so a reader never sees a
/// discovery without the recipe that produced it.
#[derive(Debug, Default)]
pub struct DiscoveryAggregator {
    collected: Mutex<Collected>,
}

impl DiscoveryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a recipe; if the oracle flagged it as new, its result becomes a discovery
    pub async fn record(&self, recipe: Recipe, is_new: bool) {
        let mut collected = self.collected.lock().await;
        if is_new {
            collected.discoveries.insert(recipe.result.clone());
        }
        collected.recipes.push(recipe);
    }

    pub async fn record_failure(&self, failure: PairFailure) {
        self.collected.lock().await.failures.push(failure);
    }

    pub async fn recipe_count(&self) -> usize {
        self.collected.lock().await.recipes.len()
    }

    pub async fn discovery_count(&self) -> usize {
        self.collected.lock().await.discoveries.len()
    }

    /// Move everything out, leaving the aggregator empty
    pub async fn take(&self) -> (Vec<Recipe>, DiscoverySet, Vec<PairFailure>) {
        let collected = std::mem::take(&mut *self.collected.lock().await);
        (collected.recipes, collected.discoveries, collected.failures)
    }
}
