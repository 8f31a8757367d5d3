//! `resortstock-recipes` — recipe definitions and expansion.
//!
//! A recipe is a named, versioned bill-of-materials: ingredient quantities
//! per single yield unit. [`RecipeResolver`] turns a recipe reference plus a
//! requested quantity into per-ingredient deltas; it returns pure data and
//! never touches the ledger.

pub mod recipe;
pub mod resolver;

pub use recipe::{Recipe, RecipeIngredient, RecipeStore};
pub use resolver::{ExpansionMode, RecipeResolver};
