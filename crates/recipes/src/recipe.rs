use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use resortstock_core::{DomainResult, ItemId, RecipeId};

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub item: ItemId,
    pub item_category: Option<String>,
    /// Quantity per single yield unit.
    pub qty: Decimal,
}

/// A named bill-of-materials mapping one yield unit to ingredient quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    /// Human-readable code, unique across recipes.
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub yield_qty: Decimal,
    pub yield_unit: String,
    pub ingredients: Vec<RecipeIngredient>,
}

/// Keyed store abstraction for recipe definitions.
pub trait RecipeStore: Send + Sync {
    fn get(&self, id: &RecipeId) -> Option<Recipe>;

    /// Insert a recipe; codes are unique (`Validation` on reuse).
    fn insert(&self, recipe: Recipe) -> DomainResult<()>;

    fn list(&self) -> Vec<Recipe>;
}

impl<S> RecipeStore for Arc<S>
where
    S: RecipeStore + ?Sized,
{
    fn get(&self, id: &RecipeId) -> Option<Recipe> {
        (**self).get(id)
    }

    fn insert(&self, recipe: Recipe) -> DomainResult<()> {
        (**self).insert(recipe)
    }

    fn list(&self) -> Vec<Recipe> {
        (**self).list()
    }
}
