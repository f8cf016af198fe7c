//! Recipe catalog
//!
//! Recipes are owned by the app's document store. The assistant only reads
//! them, so the catalog is a read-only list loaded from the app's JSON export.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One ingredient line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name
    pub name: String,
    /// Free-form amount ("大さじ1", "200g")
    #[serde(default)]
    pub amount: String,
}

/// One cooking step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Step id
    pub id: String,
    /// What to do
    pub description: String,
    /// Optional illustration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A recipe as stored by the app
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    pub servings: u32,
    pub difficulty: String,
    pub image: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
    pub tips: Vec<String>,
    pub tags: Vec<String>,
}

/// Recipe state sent along with free-form questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeContext {
    pub title: String,
    pub current_step: Option<Step>,
    /// One-based step number
    pub step_number: usize,
    pub total_steps: usize,
    pub ingredients: Vec<Ingredient>,
}

impl RecipeContext {
    /// Build the context for `recipe` at `step_index`
    #[must_use]
    pub fn new(recipe: &Recipe, step_index: usize) -> Self {
        Self {
            title: recipe.title.clone(),
            current_step: recipe.steps.get(step_index).cloned(),
            step_number: step_index + 1,
            total_steps: recipe.steps.len(),
            ingredients: recipe.ingredients.clone(),
        }
    }
}

/// Read-only recipe store
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Arc<Recipe>>,
}

impl RecipeCatalog {
    /// Create a catalog from recipes
    #[must_use]
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes: recipes.into_iter().map(Arc::new).collect(),
        }
    }

    /// Parse a JSON array of recipes
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or two recipes share an id
    pub fn from_json(json: &str) -> Result<Self> {
        let recipes: Vec<Recipe> = serde_json::from_str(json)?;

        let mut ids: Vec<&str> = recipes.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(Error::Recipe(format!("duplicate recipe id: {}", pair[0])));
        }

        Ok(Self::new(recipes))
    }

    /// Load a catalog from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), recipes = catalog.len(), "loaded recipe catalog");
        Ok(catalog)
    }

    /// Look up a recipe by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Recipe>> {
        self.recipes.iter().find(|recipe| recipe.id == id).cloned()
    }

    /// Iterate over all recipes
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Recipe>> {
        self.recipes.iter()
    }

    /// Number of recipes
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
