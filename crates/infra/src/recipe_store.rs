use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use resortstock_core::{DomainError, DomainResult, RecipeId};
use resortstock_recipes::{Recipe, RecipeStore};

/// In-memory recipe collection for tests/dev. Recipe codes are unique.
#[derive(Debug, Default)]
pub struct InMemoryRecipeStore {
    recipes: RwLock<HashMap<RecipeId, Recipe>>,
    codes: RwLock<HashSet<String>>,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecipeStore for InMemoryRecipeStore {
    fn get(&self, id: &RecipeId) -> Option<Recipe> {
        let recipes = self.recipes.read().unwrap_or_else(PoisonError::into_inner);
        recipes.get(id).cloned()
    }

    fn insert(&self, recipe: Recipe) -> DomainResult<()> {
        let mut recipes = self.recipes.write().unwrap_or_else(PoisonError::into_inner);
        let mut codes = self.codes.write().unwrap_or_else(PoisonError::into_inner);

        if recipes.contains_key(&recipe.id) {
            return Err(DomainError::validation(format!(
                "recipe id already in use: {}",
                recipe.id
            )));
        }
        if !codes.insert(recipe.code.clone()) {
            return Err(DomainError::validation(format!(
                "recipe code already in use: {}",
                recipe.code
            )));
        }
        recipes.insert(recipe.id, recipe);
        Ok(())
    }

    fn list(&self) -> Vec<Recipe> {
        let recipes = self.recipes.read().unwrap_or_else(PoisonError::into_inner);
        recipes.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn recipe(code: &str) -> Recipe {
        Recipe {
            id: RecipeId::new(),
            code: code.to_string(),
            name: "Garden salad".to_string(),
            category: None,
            yield_qty: Decimal::ONE,
            yield_unit: "portion".to_string(),
            ingredients: vec![],
        }
    }

    #[test]
    fn insert_then_get_round_trips() {
        let store = InMemoryRecipeStore::new();
        let salad = recipe("RCP-SALAD");
        store.insert(salad.clone()).unwrap();
        assert_eq!(store.get(&salad.id), Some(salad));
    }

    #[test]
    fn duplicate_code_is_rejected() {
        let store = InMemoryRecipeStore::new();
        store.insert(recipe("RCP-SALAD")).unwrap();

        let err = store.insert(recipe("RCP-SALAD")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(store.list().len(), 1);
    }
}
