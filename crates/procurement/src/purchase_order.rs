use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use resortstock_core::{
    Document, DomainError, DomainResult, ItemId, PurchaseOrderId, RequisitionId, ResortId,
    StoreId, VendorId,
};

/// Purchase order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Open,
    PartReceived,
    Closed,
    Cancelled,
}

/// One ordered line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub item: ItemId,
    pub qty: Decimal,
    /// Unit price agreed with the vendor.
    pub rate: Decimal,
}

/// A vendor-facing order derived from an approved requisition.
///
/// Lines are a copy of the requisition's approved lines at creation time;
/// later requisition edits do not change an issued order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    id: PurchaseOrderId,
    number: String,
    requisition: RequisitionId,
    vendor: VendorId,
    resort: ResortId,
    delivery_store: StoreId,
    lines: Vec<PurchaseOrderLine>,
    status: PurchaseOrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PurchaseOrder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PurchaseOrderId,
        number: String,
        requisition: RequisitionId,
        vendor: VendorId,
        resort: ResortId,
        delivery_store: StoreId,
        lines: Vec<PurchaseOrderLine>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("purchase order has no lines"));
        }
        Ok(Self {
            id,
            number,
            requisition,
            vendor,
            resort,
            delivery_store,
            lines,
            status: PurchaseOrderStatus::Open,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn requisition(&self) -> RequisitionId {
        self.requisition
    }

    pub fn vendor(&self) -> &VendorId {
        &self.vendor
    }

    pub fn resort(&self) -> &ResortId {
        &self.resort
    }

    pub fn delivery_store(&self) -> &StoreId {
        &self.delivery_store
    }

    pub fn lines(&self) -> &[PurchaseOrderLine] {
        &self.lines
    }

    pub fn status(&self) -> PurchaseOrderStatus {
        self.status
    }

    /// Record the goods receipt that closes out this order.
    ///
    /// Received quantities covering every ordered quantity close the order;
    /// a shortfall marks it part-received. Legal only while `Open`.
    pub fn mark_received(
        &mut self,
        received: &[(ItemId, Decimal)],
        now: DateTime<Utc>,
    ) -> DomainResult<PurchaseOrderStatus> {
        if self.status != PurchaseOrderStatus::Open {
            return Err(DomainError::invalid_transition(format!(
                "purchase order {}: cannot receive while {:?}",
                self.id, self.status
            )));
        }

        let mut totals: HashMap<&ItemId, Decimal> = HashMap::new();
        for (item, qty) in received {
            *totals.entry(item).or_insert(Decimal::ZERO) += *qty;
        }
        let covered = self.lines.iter().all(|line| {
            totals.get(&line.item).copied().unwrap_or(Decimal::ZERO) >= line.qty
        });

        self.status = if covered {
            PurchaseOrderStatus::Closed
        } else {
            PurchaseOrderStatus::PartReceived
        };
        self.updated_at = now;
        Ok(self.status)
    }

    /// `Open → Cancelled`.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != PurchaseOrderStatus::Open {
            return Err(DomainError::invalid_transition(format!(
                "purchase order {}: cannot cancel while {:?}",
                self.id, self.status
            )));
        }
        self.status = PurchaseOrderStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }
}

impl Document for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> PurchaseOrderId {
        self.id
    }

    fn sequence_number(&self) -> &str {
        &self.number
    }
}
