use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use resortstock_core::{
    DepartmentId, Document, DomainError, DomainResult, ItemId, RequisitionId, ResortId, UserId,
};

/// Requisition status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequisitionStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    OnHold,
    PoCreated,
    GrnCreated,
}

/// One requested line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequisitionLine {
    pub item: ItemId,
    pub qty_requested: Decimal,
    /// Set at approval; defaults to the requested quantity when the approver
    /// leaves it blank.
    pub qty_approved: Option<Decimal>,
    pub remark: Option<String>,
}

impl RequisitionLine {
    pub fn new(item: impl Into<ItemId>, qty_requested: Decimal) -> Self {
        Self {
            item: item.into(),
            qty_requested,
            qty_approved: None,
            remark: None,
        }
    }
}

/// An internal request for goods, the originating demand of the procurement
/// pipeline.
///
/// Mutated only through the transition methods below; `Rejected` and
/// `GrnCreated` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requisition {
    id: RequisitionId,
    number: String,
    resort: ResortId,
    department: DepartmentId,
    lines: Vec<RequisitionLine>,
    status: RequisitionStatus,
    requested_by: UserId,
    approved_by: Option<UserId>,
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
}

impl Requisition {
    pub fn new(
        id: RequisitionId,
        number: String,
        resort: ResortId,
        department: DepartmentId,
        requested_by: UserId,
        lines: Vec<RequisitionLine>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("requisition has no lines"));
        }
        Ok(Self {
            id,
            number,
            resort,
            department,
            lines,
            status: RequisitionStatus::Draft,
            requested_by,
            approved_by: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
            approved_at: None,
        })
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn resort(&self) -> &ResortId {
        &self.resort
    }

    pub fn department(&self) -> &DepartmentId {
        &self.department
    }

    pub fn status(&self) -> RequisitionStatus {
        self.status
    }

    pub fn lines(&self) -> &[RequisitionLine] {
        &self.lines
    }

    pub fn requested_by(&self) -> &UserId {
        &self.requested_by
    }

    pub fn approved_by(&self) -> Option<&UserId> {
        self.approved_by.as_ref()
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    /// Approved lines as `(item, quantity)`, skipping zero-quantity lines.
    pub fn approved_lines(&self) -> Vec<(ItemId, Decimal)> {
        self.lines
            .iter()
            .filter_map(|line| {
                let qty = line.qty_approved.unwrap_or(line.qty_requested);
                (qty > Decimal::ZERO).then(|| (line.item.clone(), qty))
            })
            .collect()
    }

    fn guard(&self, allowed: &[RequisitionStatus], action: &str) -> DomainResult<()> {
        if allowed.contains(&self.status) {
            return Ok(());
        }
        Err(DomainError::invalid_transition(format!(
            "requisition {}: cannot {} while {:?}",
            self.id, action, self.status
        )))
    }

    /// `Draft → Pending`.
    pub fn submit(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.guard(&[RequisitionStatus::Draft], "submit")?;
        self.status = RequisitionStatus::Pending;
        self.updated_at = now;
        Ok(())
    }

    /// `Pending | OnHold → Approved`, recording the approver.
    pub fn approve(&mut self, approver: UserId, now: DateTime<Utc>) -> DomainResult<()> {
        self.guard(
            &[RequisitionStatus::Pending, RequisitionStatus::OnHold],
            "approve",
        )?;
        for line in &mut self.lines {
            if line.qty_approved.is_none() {
                line.qty_approved = Some(line.qty_requested);
            }
        }
        self.status = RequisitionStatus::Approved;
        self.approved_by = Some(approver);
        self.approved_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// `Pending → OnHold`.
    pub fn hold(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.guard(&[RequisitionStatus::Pending], "hold")?;
        self.status = RequisitionStatus::OnHold;
        self.updated_at = now;
        Ok(())
    }

    /// `Pending | OnHold → Rejected`, storing the reason.
    pub fn reject(&mut self, reason: impl Into<String>, now: DateTime<Utc>) -> DomainResult<()> {
        self.guard(
            &[RequisitionStatus::Pending, RequisitionStatus::OnHold],
            "reject",
        )?;
        self.status = RequisitionStatus::Rejected;
        self.rejection_reason = Some(reason.into());
        self.updated_at = now;
        Ok(())
    }

    /// `Approved → PoCreated`.
    pub fn mark_po_created(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.guard(&[RequisitionStatus::Approved], "create a purchase order")?;
        self.status = RequisitionStatus::PoCreated;
        self.updated_at = now;
        Ok(())
    }

    /// `Approved | PoCreated → GrnCreated`. A purchase order is optional on
    /// the direct receipt path.
    pub fn mark_grn_created(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.guard(
            &[RequisitionStatus::Approved, RequisitionStatus::PoCreated],
            "create a GRN",
        )?;
        self.status = RequisitionStatus::GrnCreated;
        self.updated_at = now;
        Ok(())
    }
}

impl Document for Requisition {
    type Id = RequisitionId;

    fn id(&self) -> RequisitionId {
        self.id
    }

    fn sequence_number(&self) -> &str {
        &self.number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn pending_requisition() -> Requisition {
        let mut requisition = Requisition::new(
            RequisitionId::new(),
            "REQ-20260807-000001".to_string(),
            ResortId::new("KURAMATHI"),
            DepartmentId::new("KITCHEN"),
            UserId::new("chef.anil"),
            vec![
                RequisitionLine::new("RICE", dec(50)),
                RequisitionLine::new("SUGAR", dec(20)),
            ],
            Utc::now(),
        )
        .unwrap();
        requisition.submit(Utc::now()).unwrap();
        requisition
    }

    #[test]
    fn new_requisition_without_lines_is_rejected() {
        let err = Requisition::new(
            RequisitionId::new(),
            "REQ-20260807-000001".to_string(),
            ResortId::new("KURAMATHI"),
            DepartmentId::new("KITCHEN"),
            UserId::new("chef.anil"),
            vec![],
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn approve_from_pending_records_approver_and_fills_approved_quantities() {
        let mut requisition = pending_requisition();

        requisition
            .approve(UserId::new("manager.sara"), Utc::now())
            .unwrap();

        assert_eq!(requisition.status(), RequisitionStatus::Approved);
        assert_eq!(requisition.approved_by(), Some(&UserId::new("manager.sara")));
        assert!(requisition.approved_at().is_some());
        assert_eq!(
            requisition.approved_lines(),
            vec![
                (ItemId::new("RICE"), dec(50)),
                (ItemId::new("SUGAR"), dec(20)),
            ]
        );
    }

    #[test]
    fn approve_preserves_explicit_approved_quantities() {
        let mut requisition = pending_requisition();
        requisition.lines[0].qty_approved = Some(dec(30));

        requisition
            .approve(UserId::new("manager.sara"), Utc::now())
            .unwrap();

        assert_eq!(
            requisition.approved_lines(),
            vec![
                (ItemId::new("RICE"), dec(30)),
                (ItemId::new("SUGAR"), dec(20)),
            ]
        );
    }

    #[test]
    fn hold_then_approve_or_reject() {
        let mut held = pending_requisition();
        held.hold(Utc::now()).unwrap();
        assert_eq!(held.status(), RequisitionStatus::OnHold);
        held.approve(UserId::new("manager.sara"), Utc::now()).unwrap();
        assert_eq!(held.status(), RequisitionStatus::Approved);

        let mut held = pending_requisition();
        held.hold(Utc::now()).unwrap();
        held.reject("budget frozen", Utc::now()).unwrap();
        assert_eq!(held.status(), RequisitionStatus::Rejected);
        assert_eq!(held.rejection_reason(), Some("budget frozen"));
    }

    #[test]
    fn po_creation_requires_approval_first() {
        let mut requisition = pending_requisition();

        let err = requisition.mark_po_created(Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition(_)));
        assert_eq!(requisition.status(), RequisitionStatus::Pending);
    }

    #[test]
    fn grn_creation_is_legal_from_approved_and_from_po_created() {
        let mut direct = pending_requisition();
        direct.approve(UserId::new("manager.sara"), Utc::now()).unwrap();
        direct.mark_grn_created(Utc::now()).unwrap();
        assert_eq!(direct.status(), RequisitionStatus::GrnCreated);

        let mut via_po = pending_requisition();
        via_po.approve(UserId::new("manager.sara"), Utc::now()).unwrap();
        via_po.mark_po_created(Utc::now()).unwrap();
        via_po.mark_grn_created(Utc::now()).unwrap();
        assert_eq!(via_po.status(), RequisitionStatus::GrnCreated);
    }

    #[test]
    fn terminal_states_admit_no_transitions() {
        let mut rejected = pending_requisition();
        rejected.reject("not needed", Utc::now()).unwrap();
        assert!(rejected
            .approve(UserId::new("manager.sara"), Utc::now())
            .is_err());
        assert!(rejected.hold(Utc::now()).is_err());
        assert!(rejected.mark_po_created(Utc::now()).is_err());

        let mut fulfilled = pending_requisition();
        fulfilled
            .approve(UserId::new("manager.sara"), Utc::now())
            .unwrap();
        fulfilled.mark_grn_created(Utc::now()).unwrap();
        assert!(fulfilled.mark_po_created(Utc::now()).is_err());
        assert!(fulfilled.reject("late", Utc::now()).is_err());
    }
}
