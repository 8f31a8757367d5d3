use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use resortstock_core::{DomainError, DomainResult, ItemId, RecipeId};

use crate::recipe::RecipeStore;

/// How a recipe reference maps to ingredient quantities.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionMode {
    /// Each ingredient contributes `ingredient.qty * requested_qty`.
    Portion,
    /// Each ingredient contributes `ingredient.qty` — one recipe batch,
    /// regardless of the requested quantity.
    Lumpsum,
}

/// Expands recipe references into per-ingredient deltas.
///
/// Pure lookup + arithmetic; the caller decides what to do with the result.
#[derive(Debug)]
pub struct RecipeResolver<S> {
    recipes: S,
}

impl<S: RecipeStore> RecipeResolver<S> {
    pub fn new(recipes: S) -> Self {
        Self { recipes }
    }

    /// Expand `recipe_id` for `requested_qty` under `mode`.
    ///
    /// The two modes are deliberately asymmetric: `Portion` scales by the
    /// requested quantity, `Lumpsum` ignores it. Fails with `RecipeNotFound`
    /// for an unknown id.
    pub fn expand(
        &self,
        recipe_id: &RecipeId,
        requested_qty: Decimal,
        mode: ExpansionMode,
    ) -> DomainResult<Vec<(ItemId, Decimal)>> {
        let recipe = self
            .recipes
            .get(recipe_id)
            .ok_or_else(|| DomainError::recipe_not_found(recipe_id.to_string()))?;

        let deltas = recipe
            .ingredients
            .iter()
            .map(|ingredient| {
                let qty = match mode {
                    ExpansionMode::Portion => ingredient.qty * requested_qty,
                    ExpansionMode::Lumpsum => ingredient.qty,
                };
                (ingredient.item.clone(), qty)
            })
            .collect();
        Ok(deltas)
    }
}
