//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::{SharedError, SharedResult};

/// Unique identifier for a single generation run
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> SharedResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| SharedError::InvalidUuid { input: s.to_string() })
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recipe with two inputs and one result.
///
/// `src_a + src_b` and `src_b + src_a` mean the same thing; which order gets
/// stored is up to the recipe store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipe {
    /// First recipe source
    pub src_a: String,
    /// Second recipe source
    pub src_b: String,
    /// Recipe output
    pub result: String,
}

impl Recipe {
    pub fn new(src_a: impl Into<String>, src_b: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            src_a: src_a.into(),
            src_b: src_b.into(),
            result: result.into(),
        }
    }

    /// True if this recipe combines `a` and `b`, in either order
    pub fn combines(&self, a: &str, b: &str) -> bool {
        (self.src_a == a && self.src_b == b) || (self.src_a == b && self.src_b == a)
    }

    /// Reject recipes with blank names
    pub fn validate(&self) -> SharedResult<()> {
        for (field, value) in [("src_a", &self.src_a), ("src_b", &self.src_b), ("result", &self.result)] {
            if value.trim().is_empty() {
                return Err(SharedError::InvalidRecipe {
                    message: format!("{field} is empty"),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {} = {}", self.src_a, self.src_b, self.result)
    }
}

/// Like `Recipe` but without the result.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecipeSources {
    pub src_a: String,
    pub src_b: String,
}

/// How an item is made, down to items that need no recipe.
///
/// Serializes as `{"item": "Steam", "from": [{"item": "Fire"}, {"item": "Water"}]}`;
/// leaves have no `from`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeTree {
    pub item: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Box<(RecipeTree, RecipeTree)>>,
}

impl RecipeTree {
    pub fn leaf(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            from: None,
        }
    }

    pub fn node(item: impl Into<String>, src_a: RecipeTree, src_b: RecipeTree) -> Self {
        Self {
            item: item.into(),
            from: Some(Box::new((src_a, src_b))),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.from.is_none()
    }

    /// Number of combination steps on the longest branch
    pub fn depth(&self) -> usize {
        match &self.from {
            Some(sources) => 1 + sources.0.depth().max(sources.1.depth()),
            None => 0,
        }
    }

    /// Every combination in the tree, innermost first
    pub fn recipes(&self) -> Vec<Recipe> {
        let mut recipes = Vec::new();
        self.collect_recipes(&mut recipes);
        recipes
    }

    fn collect_recipes(&self, out: &mut Vec<Recipe>) {
        if let Some(sources) = &self.from {
            sources.0.collect_recipes(out);
            sources.1.collect_recipes(out);
            out.push(Recipe::new(&sources.0.item, &sources.1.item, &self.item));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_combines_either_order() {
        let recipe = Recipe::new("Water", "Fire", "Steam");

        assert!(recipe.combines("Water", "Fire"));
        assert!(recipe.combines("Fire", "Water"));
        assert!(!recipe.combines("Water", "Earth"));
        assert_eq!(recipe.to_string(), "Water + Fire = Steam");
    }

    #[test]
    fn test_recipe_validation() {
        assert!(Recipe::new("Water", "Fire", "Steam").validate().is_ok());

        let blank = Recipe::new("Water", " ", "Steam");
        assert!(matches!(blank.validate(), Err(SharedError::InvalidRecipe { .. })));
    }

    #[test]
    fn test_recipe_json_field_names() {
        let recipe = Recipe::new("Water", "Fire", "Steam");
        let json = serde_json::to_value(&recipe).unwrap();

        assert_eq!(json["src_a"], "Water");
        assert_eq!(json["src_b"], "Fire");
        assert_eq!(json["result"], "Steam");
    }

    #[test]
    fn test_recipe_tree_shape() {
        let mud = RecipeTree::node(
            "Mud",
            RecipeTree::leaf("Earth"),
            RecipeTree::node("Lake", RecipeTree::leaf("Water"), RecipeTree::leaf("Water")),
        );

        assert_eq!(mud.depth(), 2);
        assert!(!mud.is_leaf());
        assert_eq!(
            mud.recipes(),
            vec![Recipe::new("Water", "Water", "Lake"), Recipe::new("Earth", "Lake", "Mud")]
        );

        let json = serde_json::to_value(&mud).unwrap();
        assert_eq!(json["from"][0], serde_json::json!({"item": "Earth"}));
        assert_eq!(json["from"][1]["from"][1]["item"], "Water");
    }

    #[test]
    fn test_run_id_parse() {
        let id = RunId::new();
        let parsed = RunId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);

        assert!(matches!(
            RunId::from_string("not-a-uuid"),
            Err(SharedError::InvalidUuid { .. })
        ));
    }
}
