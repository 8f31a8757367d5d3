//! `resortstock-ledger` — the stock ledger.
//!
//! Single source of truth for on-hand quantities, keyed by
//! `(resort, store, item)`. Documents (GRNs, consumptions) cause mutations
//! through [`StockLedger::apply`]; the ledger itself has no knowledge of why
//! a delta happens.

pub mod stock;

pub use stock::{AdjustmentBatch, Applied, StockEntry, StockKey, StockLedger};
