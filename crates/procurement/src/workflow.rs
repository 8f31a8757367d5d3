use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use resortstock_core::{
    DepartmentId, Document, DocumentKind, DocumentStore, DomainError, DomainResult, GrnId,
    ItemId, NumberSequenceGenerator, PurchaseOrderId, RequisitionId, ResortId, StoreId, UserId,
    VendorId,
};
use resortstock_ledger::{AdjustmentBatch, StockLedger};

use crate::grn::{Grn, GrnLine, GrnStatus};
use crate::purchase_order::{PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus};
use crate::requisition::{Requisition, RequisitionLine, RequisitionStatus};

/// Payload: submit a new requisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequisition {
    pub resort: ResortId,
    pub department: DepartmentId,
    pub requested_by: UserId,
    pub lines: Vec<RequisitionLine>,
}

/// Payload: derive a purchase order from an approved requisition.
///
/// Order lines are copied from the requisition's approved lines; `rates`
/// supplies per-item unit prices (missing items default to zero).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePurchaseOrder {
    pub vendor: VendorId,
    pub delivery_store: StoreId,
    pub rates: Vec<(ItemId, Decimal)>,
}

/// Payload: record a goods receipt against a requisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGrn {
    pub purchase_order: Option<PurchaseOrderId>,
    pub store: StoreId,
    pub received_by: UserId,
    pub lines: Vec<GrnLine>,
}

/// The requisition → purchase order → GRN orchestration engine.
///
/// Holds typed handles to the stores it needs; document state machines stay
/// pure and this engine sequences load → transition → persist, posting GRN
/// receipts to the stock ledger at closure.
pub struct ProcurementWorkflow<R, P, G> {
    requisitions: R,
    purchase_orders: P,
    grns: G,
    ledger: Arc<StockLedger>,
    sequences: Arc<NumberSequenceGenerator>,
}

impl<R, P, G> ProcurementWorkflow<R, P, G>
where
    R: DocumentStore<Requisition>,
    P: DocumentStore<PurchaseOrder>,
    G: DocumentStore<Grn>,
{
    pub fn new(
        requisitions: R,
        purchase_orders: P,
        grns: G,
        ledger: Arc<StockLedger>,
        sequences: Arc<NumberSequenceGenerator>,
    ) -> Self {
        Self {
            requisitions,
            purchase_orders,
            grns,
            ledger,
            sequences,
        }
    }

    /// Create and submit a requisition in one step.
    pub fn submit_requisition(&self, payload: SubmitRequisition) -> DomainResult<Requisition> {
        let now = Utc::now();
        let mut requisition = Requisition::new(
            RequisitionId::new(),
            self.sequences.next(DocumentKind::Requisition),
            payload.resort,
            payload.department,
            payload.requested_by,
            payload.lines,
            now,
        )?;
        requisition.submit(now)?;
        self.requisitions.insert(requisition.clone())?;
        info!(
            id = %requisition.id(),
            number = requisition.sequence_number(),
            "requisition submitted"
        );
        Ok(requisition)
    }

    pub fn approve_requisition(
        &self,
        id: RequisitionId,
        approver: UserId,
    ) -> DomainResult<Requisition> {
        let mut requisition = self.requisitions.get(&id).ok_or(DomainError::NotFound)?;
        requisition.approve(approver, Utc::now())?;
        self.requisitions.update(requisition.clone())?;
        info!(id = %id, "requisition approved");
        Ok(requisition)
    }

    pub fn hold_requisition(&self, id: RequisitionId) -> DomainResult<Requisition> {
        let mut requisition = self.requisitions.get(&id).ok_or(DomainError::NotFound)?;
        requisition.hold(Utc::now())?;
        self.requisitions.update(requisition.clone())?;
        info!(id = %id, "requisition placed on hold");
        Ok(requisition)
    }

    pub fn reject_requisition(
        &self,
        id: RequisitionId,
        reason: impl Into<String>,
    ) -> DomainResult<Requisition> {
        let mut requisition = self.requisitions.get(&id).ok_or(DomainError::NotFound)?;
        requisition.reject(reason, Utc::now())?;
        self.requisitions.update(requisition.clone())?;
        info!(id = %id, "requisition rejected");
        Ok(requisition)
    }

    /// Derive a purchase order from an approved requisition.
    pub fn create_purchase_order(
        &self,
        requisition_id: RequisitionId,
        payload: CreatePurchaseOrder,
    ) -> DomainResult<PurchaseOrder> {
        let mut requisition = self
            .requisitions
            .get(&requisition_id)
            .ok_or(DomainError::NotFound)?;

        let now = Utc::now();
        requisition.mark_po_created(now)?;

        let rates: HashMap<ItemId, Decimal> = payload.rates.into_iter().collect();
        let lines: Vec<PurchaseOrderLine> = requisition
            .approved_lines()
            .into_iter()
            .map(|(item, qty)| PurchaseOrderLine {
                rate: rates.get(&item).copied().unwrap_or(Decimal::ZERO),
                item,
                qty,
            })
            .collect();

        let order = PurchaseOrder::new(
            PurchaseOrderId::new(),
            self.sequences.next(DocumentKind::PurchaseOrder),
            requisition_id,
            payload.vendor,
            requisition.resort().clone(),
            payload.delivery_store,
            lines,
            now,
        )?;
        self.purchase_orders.insert(order.clone())?;
        self.requisitions.update(requisition)?;
        info!(
            id = %order.id(),
            number = order.sequence_number(),
            requisition = %requisition_id,
            "purchase order created"
        );
        Ok(order)
    }

    /// Record a goods receipt. Accepted from `Approved` (direct path, no
    /// order) or `PoCreated` requisitions.
    pub fn create_grn(
        &self,
        requisition_id: RequisitionId,
        payload: CreateGrn,
    ) -> DomainResult<Grn> {
        let mut requisition = self
            .requisitions
            .get(&requisition_id)
            .ok_or(DomainError::NotFound)?;

        if let Some(order_id) = payload.purchase_order {
            let order = self
                .purchase_orders
                .get(&order_id)
                .ok_or(DomainError::NotFound)?;
            if order.requisition() != requisition_id {
                return Err(DomainError::validation(format!(
                    "purchase order {order_id} belongs to a different requisition"
                )));
            }
        }

        let now = Utc::now();
        requisition.mark_grn_created(now)?;

        let grn = Grn::new(
            GrnId::new(),
            self.sequences.next(DocumentKind::Grn),
            payload.purchase_order,
            requisition_id,
            requisition.resort().clone(),
            payload.store,
            payload.received_by,
            payload.lines,
            now,
        )?;
        self.grns.insert(grn.clone())?;
        self.requisitions.update(requisition)?;
        info!(
            id = %grn.id(),
            number = grn.sequence_number(),
            requisition = %requisition_id,
            "grn created"
        );
        Ok(grn)
    }

    /// Close a GRN: post its receipt to the ledger, then flip statuses.
    ///
    /// All document-side validation happens before the ledger is touched; a
    /// failed posting leaves the GRN `Created` and the ledger unchanged.
    pub fn close_grn(&self, grn_id: GrnId) -> DomainResult<Grn> {
        let mut grn = self.grns.get(&grn_id).ok_or(DomainError::NotFound)?;
        if grn.status() != GrnStatus::Created {
            return Err(DomainError::invalid_transition(format!(
                "grn {grn_id}: cannot close while {:?}",
                grn.status()
            )));
        }

        let mut order = match grn.purchase_order() {
            Some(order_id) => {
                let order = self
                    .purchase_orders
                    .get(&order_id)
                    .ok_or(DomainError::NotFound)?;
                if order.status() != PurchaseOrderStatus::Open {
                    return Err(DomainError::invalid_transition(format!(
                        "purchase order {order_id}: cannot receive while {:?}",
                        order.status()
                    )));
                }
                Some(order)
            }
            None => None,
        };

        // Token = GRN id: a replayed closure can never double-post.
        let mut batch = AdjustmentBatch::with_token(*grn.id().as_uuid());
        for (key, qty) in grn.receipt_deltas() {
            batch.push(key, qty);
        }
        let applied = self.ledger.apply(batch)?;

        let now = Utc::now();
        grn.close(now)?;
        self.grns.update(grn.clone())?;

        if let Some(order) = order.as_mut() {
            let status = order.mark_received(&grn.received_quantities(), now)?;
            self.purchase_orders.update(order.clone())?;
            info!(id = %order.id(), ?status, "purchase order receipt recorded");
        }

        match self.requisitions.get(&grn.requisition()) {
            Some(requisition) if requisition.status() == RequisitionStatus::GrnCreated => {}
            Some(requisition) => warn!(
                requisition = %grn.requisition(),
                status = ?requisition.status(),
                "grn closed against a requisition not marked grn_created"
            ),
            None => warn!(
                requisition = %grn.requisition(),
                "grn closed against a missing requisition"
            ),
        }

        info!(
            id = %grn_id,
            entries = applied.entries().len(),
            replayed = applied.is_replayed(),
            "grn closed, receipt posted"
        );
        Ok(grn)
    }

    /// Cancel an open purchase order.
    pub fn cancel_purchase_order(&self, id: PurchaseOrderId) -> DomainResult<PurchaseOrder> {
        let mut order = self.purchase_orders.get(&id).ok_or(DomainError::NotFound)?;
        order.cancel(Utc::now())?;
        self.purchase_orders.update(order.clone())?;
        info!(id = %id, "purchase order cancelled");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resortstock_infra::InMemoryDocumentStore;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    type TestWorkflow = ProcurementWorkflow<
        Arc<InMemoryDocumentStore<Requisition>>,
        Arc<InMemoryDocumentStore<PurchaseOrder>>,
        Arc<InMemoryDocumentStore<Grn>>,
    >;

    fn workflow() -> (TestWorkflow, Arc<StockLedger>) {
        let ledger = Arc::new(StockLedger::new());
        let workflow = ProcurementWorkflow::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryDocumentStore::new()),
            ledger.clone(),
            Arc::new(NumberSequenceGenerator::new()),
        );
        (workflow, ledger)
    }

    fn submit(workflow: &TestWorkflow) -> Requisition {
        workflow
            .submit_requisition(SubmitRequisition {
                resort: ResortId::new("KURAMATHI"),
                department: DepartmentId::new("KITCHEN"),
                requested_by: UserId::new("chef.anil"),
                lines: vec![RequisitionLine::new("RICE", dec(50))],
            })
            .unwrap()
    }

    #[test]
    fn create_purchase_order_requires_an_approved_requisition() {
        let (workflow, _) = workflow();
        let requisition = submit(&workflow);

        let err = workflow
            .create_purchase_order(
                requisition.id(),
                CreatePurchaseOrder {
                    vendor: VendorId::new("ISLAND-TRADERS"),
                    delivery_store: StoreId::new("MAIN"),
                    rates: vec![],
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));
    }

    #[test]
    fn purchase_order_copies_approved_lines_and_rates() {
        let (workflow, _) = workflow();
        let requisition = submit(&workflow);
        workflow
            .approve_requisition(requisition.id(), UserId::new("manager.sara"))
            .unwrap();

        let order = workflow
            .create_purchase_order(
                requisition.id(),
                CreatePurchaseOrder {
                    vendor: VendorId::new("ISLAND-TRADERS"),
                    delivery_store: StoreId::new("MAIN"),
                    rates: vec![(ItemId::new("RICE"), dec(12))],
                },
            )
            .unwrap();

        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.lines()[0].item, ItemId::new("RICE"));
        assert_eq!(order.lines()[0].qty, dec(50));
        assert_eq!(order.lines()[0].rate, dec(12));
        assert_eq!(order.status(), PurchaseOrderStatus::Open);
    }

    #[test]
    fn closing_a_grn_posts_the_receipt_exactly_once() {
        let (workflow, ledger) = workflow();
        let requisition = submit(&workflow);
        workflow
            .approve_requisition(requisition.id(), UserId::new("manager.sara"))
            .unwrap();
        let grn = workflow
            .create_grn(
                requisition.id(),
                CreateGrn {
                    purchase_order: None,
                    store: StoreId::new("MAIN"),
                    received_by: UserId::new("storekeeper.ibrahim"),
                    lines: vec![GrnLine::new("RICE", dec(50), dec(50))],
                },
            )
            .unwrap();

        let closed = workflow.close_grn(grn.id()).unwrap();
        assert_eq!(closed.status(), GrnStatus::Closed);
        assert_eq!(
            ledger.read(&resortstock_ledger::StockKey::new("KURAMATHI", "MAIN", "RICE")),
            dec(50)
        );

        // Replayed closure attempt is an illegal transition, not a re-post.
        let err = workflow.close_grn(grn.id()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));
        assert_eq!(
            ledger.read(&resortstock_ledger::StockKey::new("KURAMATHI", "MAIN", "RICE")),
            dec(50)
        );
    }

    #[test]
    fn grn_against_a_foreign_purchase_order_is_rejected() {
        let (workflow, _) = workflow();

        let first = submit(&workflow);
        workflow
            .approve_requisition(first.id(), UserId::new("manager.sara"))
            .unwrap();
        let order = workflow
            .create_purchase_order(
                first.id(),
                CreatePurchaseOrder {
                    vendor: VendorId::new("ISLAND-TRADERS"),
                    delivery_store: StoreId::new("MAIN"),
                    rates: vec![],
                },
            )
            .unwrap();

        let second = submit(&workflow);
        workflow
            .approve_requisition(second.id(), UserId::new("manager.sara"))
            .unwrap();

        let err = workflow
            .create_grn(
                second.id(),
                CreateGrn {
                    purchase_order: Some(order.id()),
                    store: StoreId::new("MAIN"),
                    received_by: UserId::new("storekeeper.ibrahim"),
                    lines: vec![GrnLine::new("RICE", dec(50), dec(50))],
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
