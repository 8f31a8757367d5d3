//! `resortstock-procurement` — the requisition → purchase order → GRN
//! pipeline.
//!
//! Document types carry their own state machines (pure, no IO);
//! [`ProcurementWorkflow`] orchestrates them against injected stores and
//! posts GRN receipts to the stock ledger.

pub mod grn;
pub mod purchase_order;
pub mod requisition;
pub mod workflow;

pub use grn::{Grn, GrnLine, GrnStatus};
pub use purchase_order::{PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus};
pub use requisition::{Requisition, RequisitionLine, RequisitionStatus};
pub use workflow::{CreateGrn, CreatePurchaseOrder, ProcurementWorkflow, SubmitRequisition};
