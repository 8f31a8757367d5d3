//! Human-readable document sequence numbers.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

/// Kinds of documents that carry a sequence number.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Requisition,
    PurchaseOrder,
    Grn,
    Consumption,
}

impl DocumentKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Requisition => "REQ",
            DocumentKind::PurchaseOrder => "PO",
            DocumentKind::Grn => "GRN",
            DocumentKind::Consumption => "CNS",
        }
    }
}

/// Issues prefixed, date-based document numbers: `REQ-20260807-000042`.
///
/// A per-kind counter behind a mutex keeps issuance collision-free under
/// concurrent workflow operations sharing one generator. Collisions across
/// generator instances (or across process restarts) are caught by the
/// document store's uniqueness index at insert time, never silently
/// overwritten.
#[derive(Debug, Default)]
pub struct NumberSequenceGenerator {
    counters: Mutex<HashMap<DocumentKind, u64>>,
}

impl NumberSequenceGenerator {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Issue the next number for `kind`.
    pub fn next(&self, kind: DocumentKind) -> String {
        let mut counters = self
            .counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let counter = counters.entry(kind).or_insert(0);
        *counter += 1;
        let issued = *counter;
        format!(
            "{}-{}-{:06}",
            kind.prefix(),
            Utc::now().format("%Y%m%d"),
            issued
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn numbers_carry_kind_prefix_and_date() {
        let seq = NumberSequenceGenerator::new();
        let number = seq.next(DocumentKind::Requisition);
        let date = Utc::now().format("%Y%m%d").to_string();
        assert!(number.starts_with(&format!("REQ-{date}-")));
        assert!(number.ends_with("000001"));
    }

    #[test]
    fn counters_are_independent_per_kind() {
        let seq = NumberSequenceGenerator::new();
        seq.next(DocumentKind::Requisition);
        seq.next(DocumentKind::Requisition);
        let po = seq.next(DocumentKind::PurchaseOrder);
        assert!(po.ends_with("000001"));
        let req = seq.next(DocumentKind::Requisition);
        assert!(req.ends_with("000003"));
    }

    #[test]
    fn concurrent_issuance_never_collides() {
        let seq = Arc::new(NumberSequenceGenerator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let seq = seq.clone();
                std::thread::spawn(move || {
                    (0..100)
                        .map(|_| seq.next(DocumentKind::Grn))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut issued = HashSet::new();
        for handle in handles {
            for number in handle.join().expect("issuer thread panicked") {
                assert!(issued.insert(number), "sequence number issued twice");
            }
        }
        assert_eq!(issued.len(), 800);
    }
}
