//! Cooking session state and the recipe catalog

mod recipe;
mod store;

pub use recipe::{Ingredient, Recipe, RecipeCatalog, RecipeContext, Step};
pub use store::{ConversationMessage, CookingSession, Panel};
