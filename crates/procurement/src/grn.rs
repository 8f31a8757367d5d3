use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use resortstock_core::{
    Document, DomainError, DomainResult, GrnId, ItemId, PurchaseOrderId, RequisitionId,
    ResortId, StoreId, UserId,
};
use resortstock_ledger::StockKey;

/// GRN status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrnStatus {
    Created,
    Closed,
}

/// One received line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrnLine {
    pub item: ItemId,
    pub qty_requested: Decimal,
    pub qty_received: Decimal,
    pub remark: Option<String>,
}

impl GrnLine {
    pub fn new(item: impl Into<ItemId>, qty_requested: Decimal, qty_received: Decimal) -> Self {
        Self {
            item: item.into(),
            qty_requested,
            qty_received,
            remark: None,
        }
    }
}

/// Goods received note: confirmation of physical receipt.
///
/// Ledger increments derived from a GRN happen exactly once, at the
/// `Created → Closed` transition — never at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grn {
    id: GrnId,
    number: String,
    /// Optional: the direct requisition-to-GRN path carries no order.
    purchase_order: Option<PurchaseOrderId>,
    requisition: RequisitionId,
    resort: ResortId,
    store: StoreId,
    lines: Vec<GrnLine>,
    status: GrnStatus,
    received_by: UserId,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
}

impl Grn {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: GrnId,
        number: String,
        purchase_order: Option<PurchaseOrderId>,
        requisition: RequisitionId,
        resort: ResortId,
        store: StoreId,
        received_by: UserId,
        lines: Vec<GrnLine>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("GRN has no lines"));
        }
        Ok(Self {
            id,
            number,
            purchase_order,
            requisition,
            resort,
            store,
            lines,
            status: GrnStatus::Created,
            received_by,
            created_at: now,
            closed_at: None,
        })
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn purchase_order(&self) -> Option<PurchaseOrderId> {
        self.purchase_order
    }

    pub fn requisition(&self) -> RequisitionId {
        self.requisition
    }

    pub fn resort(&self) -> &ResortId {
        &self.resort
    }

    pub fn store(&self) -> &StoreId {
        &self.store
    }

    pub fn lines(&self) -> &[GrnLine] {
        &self.lines
    }

    pub fn status(&self) -> GrnStatus {
        self.status
    }

    pub fn received_by(&self) -> &UserId {
        &self.received_by
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    /// Positive ledger deltas for this receipt, one per line with a received
    /// quantity.
    pub fn receipt_deltas(&self) -> Vec<(StockKey, Decimal)> {
        self.lines
            .iter()
            .filter(|line| line.qty_received > Decimal::ZERO)
            .map(|line| {
                (
                    StockKey::new(
                        self.resort.clone(),
                        self.store.clone(),
                        line.item.clone(),
                    ),
                    line.qty_received,
                )
            })
            .collect()
    }

    /// Received quantities as `(item, qty)`, for purchase order coverage.
    pub fn received_quantities(&self) -> Vec<(ItemId, Decimal)> {
        self.lines
            .iter()
            .map(|line| (line.item.clone(), line.qty_received))
            .collect()
    }

    /// `Created → Closed`.
    pub fn close(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != GrnStatus::Created {
            return Err(DomainError::invalid_transition(format!(
                "grn {}: cannot close while {:?}",
                self.id, self.status
            )));
        }
        self.status = GrnStatus::Closed;
        self.closed_at = Some(now);
        Ok(())
    }
}

impl Document for Grn {
    type Id = GrnId;

    fn id(&self) -> GrnId {
        self.id
    }

    fn sequence_number(&self) -> &str {
        &self.number
    }
}
