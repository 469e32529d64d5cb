//! In-memory recipe store

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use shared::{Recipe, RecipeSources, RecipeTree};
use tokio::sync::RwLock;

use crate::error::{GeneratorError, GeneratorResult};
use crate::traits::RecipeStore;

#[derive(Debug, Default)]
struct StoreState {
    items: BTreeSet<String>,
    /// Items that need no recipe
    base: BTreeSet<String>,
    /// Keyed by the sorted source pair
    recipes: HashMap<(String, String), String>,
}

/// Recipe store held in memory.
///
/// Pairs are stored under their sorted sources, so `A + B` and `B + A` are one
/// recipe. Adding a recipe requires both sources to exist and registers the
/// result as an item. Items added through `insert_items` are base items.
#[derive(Debug)]
pub struct MemoryRecipeStore {
    state: RwLock<StoreState>,
    available: AtomicBool,
}

impl StoreState {
    /// Source pairs known to produce `item`, sorted
    fn sources_of(&self, item: &str) -> Vec<(&str, &str)> {
        let mut sources: Vec<(&str, &str)> = self
            .recipes
            .iter()
            .filter(|(_, result)| result.as_str() == item)
            .map(|((src_a, src_b), _)| (src_a.as_str(), src_b.as_str()))
            .collect();
        sources.sort();
        sources
    }

    /// Fewest combinations needed to reach each item from the base items.
    /// Items with no such path are absent.
    fn levels(&self) -> HashMap<&str, usize> {
        let mut levels: HashMap<&str, usize> = self.base.iter().map(|item| (item.as_str(), 0)).collect();
        loop {
            let mut changed = false;
            for ((src_a, src_b), result) in &self.recipes {
                let (Some(&level_a), Some(&level_b)) = (levels.get(src_a.as_str()), levels.get(src_b.as_str())) else {
                    continue;
                };
                let level = level_a.max(level_b) + 1;
                if levels.get(result.as_str()).map_or(true, |&current| level < current) {
                    levels.insert(result.as_str(), level);
                    changed = true;
                }
            }
            if !changed {
                return levels;
            }
        }
    }

    /// Expand `item` through a recipe whose sources are strictly closer to the
    /// base items, so cycles in the recipe graph are never followed
    fn expand(&self, item: &str, levels: &HashMap<&str, usize>) -> RecipeTree {
        let level = match levels.get(item) {
            Some(&level) if level > 0 => level,
            _ => return RecipeTree::leaf(item),
        };
        let shortest = self.sources_of(item).into_iter().find(|(src_a, src_b)| {
            match (levels.get(src_a), levels.get(src_b)) {
                (Some(&level_a), Some(&level_b)) => level_a.max(level_b) + 1 == level,
                _ => false,
            }
        });
        match shortest {
            Some((src_a, src_b)) => RecipeTree::node(item, self.expand(src_a, levels), self.expand(src_b, levels)),
            None => RecipeTree::leaf(item),
        }
    }
}

fn canonical(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Register base items: known without a recipe, leaves of every recipe tree
    pub async fn insert_items<I, S>(&self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.write().await;
        for item in items {
            let item = item.into();
            state.base.insert(item.clone());
            state.items.insert(item);
        }
    }

    /// Load recipes without item checks, registering every name they mention
    pub async fn import_recipes<I>(&self, recipes: I) -> usize
    where
        I: IntoIterator<Item = Recipe>,
    {
        let mut state = self.state.write().await;
        let mut imported = 0;
        for recipe in recipes {
            state.items.insert(recipe.src_a.clone());
            state.items.insert(recipe.src_b.clone());
            state.items.insert(recipe.result.clone());
            state
                .recipes
                .insert(canonical(&recipe.src_a, &recipe.src_b), recipe.result);
            imported += 1;
        }
        imported
    }

    /// Simulate the store going down (or coming back)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn item_count(&self) -> usize {
        self.state.read().await.items.len()
    }

    pub async fn recipe_count(&self) -> usize {
        self.state.read().await.recipes.len()
    }

    /// Result of `a + b` in either order, if known
    pub async fn result_of(&self, a: &str, b: &str) -> Option<String> {
        self.state.read().await.recipes.get(&canonical(a, b)).cloned()
    }

    fn ensure_available(&self) -> GeneratorResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GeneratorError::store_unavailable("in-memory store marked unavailable"))
        }
    }
}

impl Default for MemoryRecipeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn missing_recipes(&self, left: &str, candidates: &[String]) -> GeneratorResult<Vec<String>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(candidates
            .iter()
            .filter(|candidate| !state.recipes.contains_key(&canonical(left, candidate)))
            .cloned()
            .collect())
    }

    async fn add_recipe(&self, recipe: &Recipe) -> GeneratorResult<()> {
        self.ensure_available()?;
        recipe.validate()?;

        let mut state = self.state.write().await;
        for source in [&recipe.src_a, &recipe.src_b] {
            if !state.items.contains(source) {
                return Err(GeneratorError::ItemNotFound { item: source.clone() });
            }
        }
        state.items.insert(recipe.result.clone());
        // First answer for a pair wins
        state
            .recipes
            .entry(canonical(&recipe.src_a, &recipe.src_b))
            .or_insert_with(|| recipe.result.clone());
        Ok(())
    }

    async fn list_recipes(&self, item: &str) -> GeneratorResult<Vec<RecipeSources>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .sources_of(item)
            .into_iter()
            .map(|(src_a, src_b)| RecipeSources {
                src_a: src_a.to_string(),
                src_b: src_b.to_string(),
            })
            .collect())
    }

    async fn items_like(&self, query: &str, max: usize) -> GeneratorResult<Vec<String>> {
        self.ensure_available()?;
        // Only letters, digits and spaces take part in the match
        let needle: String = query
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
            .collect::<String>()
            .to_lowercase();

        let state = self.state.read().await;
        Ok(state
            .items
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .take(max)
            .cloned()
            .collect())
    }

    async fn recipe_tree(&self, item: &str) -> GeneratorResult<RecipeTree> {
        self.ensure_available()?;
        let state = self.state.read().await;
        if !state.items.contains(item) {
            return Err(GeneratorError::ItemNotFound { item: item.to_string() });
        }
        let levels = state.levels();
        Ok(state.expand(item, &levels))
    }
}
