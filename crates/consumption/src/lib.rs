//! `resortstock-consumption` — usage events that remove stock.
//!
//! A consumption is posted either lumpsum (items as given) or recipe-based
//! (lines expanded through the recipe resolver). Every posting hits the
//! ledger as one atomic batch: a multi-line consumption never half-applies.

pub mod consumption;
pub mod engine;

pub use consumption::{Consumption, ConsumptionKind, ConsumptionLine};
pub use engine::{ConsumptionDraft, ConsumptionEngine, PostedConsumption};
