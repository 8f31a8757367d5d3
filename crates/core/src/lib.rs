//! `resortstock-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod document;
pub mod error;
pub mod id;
pub mod sequence;

pub use document::{Document, DocumentStore};
pub use error::{DomainError, DomainResult};
pub use id::{
    ConsumptionId, DepartmentId, GrnId, ItemId, PurchaseOrderId, RecipeId, RequisitionId,
    ResortId, StoreId, UserId, VendorId,
};
pub use sequence::{DocumentKind, NumberSequenceGenerator};
