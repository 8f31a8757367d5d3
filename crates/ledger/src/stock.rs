use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use resortstock_core::{DomainError, DomainResult, ItemId, ResortId, StoreId};

/// Composite ledger key: one on-hand quantity per `(resort, store, item)`.
///
/// `Ord` follows field order; multi-key operations rely on it for sorted
/// lock acquisition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockKey {
    pub resort: ResortId,
    pub store: StoreId,
    pub item: ItemId,
}

impl StockKey {
    pub fn new(
        resort: impl Into<ResortId>,
        store: impl Into<StoreId>,
        item: impl Into<ItemId>,
    ) -> Self {
        Self {
            resort: resort.into(),
            store: store.into(),
            item: item.into(),
        }
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}/{}", self.resort, self.store, self.item)
    }
}

/// One ledger row: key plus current on-hand quantity.
///
/// Rows spring into existence at zero on first adjustment and are never
/// deleted; a quantity of zero persists as a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub key: StockKey,
    pub quantity: Decimal,
}

/// A set of deltas applied as one atomic unit.
///
/// The optional token identifies the business event that produced the batch
/// (GRN id, consumption id). Replaying a token is a no-op; callers that
/// guarantee single-invocation dispatch may omit it.
#[derive(Debug, Clone, Default)]
pub struct AdjustmentBatch {
    deltas: Vec<(StockKey, Decimal)>,
    token: Option<Uuid>,
}

impl AdjustmentBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: Uuid) -> Self {
        Self {
            deltas: Vec::new(),
            token: Some(token),
        }
    }

    pub fn push(&mut self, key: StockKey, delta: Decimal) {
        self.deltas.push((key, delta));
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn deltas(&self) -> &[(StockKey, Decimal)] {
        &self.deltas
    }
}

/// Outcome of applying an [`AdjustmentBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// All deltas applied; entries carry the post-application quantities,
    /// one per distinct key, in key order.
    Committed(Vec<StockEntry>),
    /// The batch token was applied before; nothing was re-applied.
    Replayed,
}

impl Applied {
    pub fn is_replayed(&self) -> bool {
        matches!(self, Applied::Replayed)
    }

    pub fn entries(&self) -> &[StockEntry] {
        match self {
            Applied::Committed(entries) => entries,
            Applied::Replayed => &[],
        }
    }
}

/// Keyed quantity store with per-key serialization.
///
/// Every key owns a mutex in the lock table: adjustments to the same key
/// serialize, adjustments to different keys proceed concurrently. A batch
/// locks its (deduplicated, sorted) key set, validates every resulting
/// quantity, then applies every delta; on any failure nothing is applied.
#[derive(Debug, Default)]
pub struct StockLedger {
    cells: RwLock<HashMap<StockKey, Arc<Mutex<Decimal>>>>,
    applied_tokens: Mutex<HashSet<Uuid>>,
}

fn lock_cell(cell: &Mutex<Decimal>) -> MutexGuard<'_, Decimal> {
    // A panicked holder must not wedge the ledger.
    cell.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current quantity for `key`; zero for unseen keys, not an error.
    pub fn read(&self, key: &StockKey) -> Decimal {
        let cells = self.cells.read().unwrap_or_else(PoisonError::into_inner);
        match cells.get(key) {
            Some(cell) => *lock_cell(cell),
            None => Decimal::ZERO,
        }
    }

    /// Snapshot of every ledger row in one store, sorted by item.
    pub fn on_hand(&self, resort: &ResortId, store: &StoreId) -> Vec<(ItemId, Decimal)> {
        let cells = self.cells.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<(ItemId, Decimal)> = cells
            .iter()
            .filter(|(key, _)| &key.resort == resort && &key.store == store)
            .map(|(key, cell)| (key.item.clone(), *lock_cell(cell)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    /// Single-key adjustment: the one-delta batch. Returns the new quantity.
    pub fn adjust(&self, key: StockKey, delta: Decimal) -> DomainResult<Decimal> {
        let entries = self.apply_deltas(&[(key, delta)])?;
        Ok(entries
            .into_iter()
            .next()
            .map(|entry| entry.quantity)
            .unwrap_or(Decimal::ZERO))
    }

    /// Apply a batch atomically.
    ///
    /// A batch whose token was applied before returns [`Applied::Replayed`]
    /// without touching the ledger. A failed batch releases its token so the
    /// same business event stays retryable after the cause is fixed.
    pub fn apply(&self, batch: AdjustmentBatch) -> DomainResult<Applied> {
        let Some(token) = batch.token else {
            return self.apply_deltas(&batch.deltas).map(Applied::Committed);
        };

        {
            let mut tokens = self
                .applied_tokens
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !tokens.insert(token) {
                debug!(%token, "adjustment batch replayed, ignoring");
                return Ok(Applied::Replayed);
            }
        }

        match self.apply_deltas(&batch.deltas) {
            Ok(entries) => Ok(Applied::Committed(entries)),
            Err(err) => {
                self.applied_tokens
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&token);
                Err(err)
            }
        }
    }

    fn apply_deltas(&self, deltas: &[(StockKey, Decimal)]) -> DomainResult<Vec<StockEntry>> {
        // Coalesce duplicate keys; the BTreeMap doubles as the sorted lock
        // order (deadlock avoidance across overlapping batches).
        let mut coalesced: BTreeMap<StockKey, Decimal> = BTreeMap::new();
        for (key, delta) in deltas {
            *coalesced.entry(key.clone()).or_insert(Decimal::ZERO) += *delta;
        }
        if coalesced.is_empty() {
            return Ok(Vec::new());
        }

        // Get-or-create cells at zero under the table lock, released before
        // the per-key locks are taken.
        let cells: Vec<(StockKey, Decimal, Arc<Mutex<Decimal>>)> = {
            let mut table = self.cells.write().unwrap_or_else(PoisonError::into_inner);
            coalesced
                .into_iter()
                .map(|(key, delta)| {
                    let cell = table
                        .entry(key.clone())
                        .or_insert_with(|| Arc::new(Mutex::new(Decimal::ZERO)))
                        .clone();
                    (key, delta, cell)
                })
                .collect()
        };

        let mut guards: Vec<MutexGuard<'_, Decimal>> =
            cells.iter().map(|(_, _, cell)| lock_cell(cell)).collect();

        // Validate every resulting quantity before touching anything.
        let mut updated = Vec::with_capacity(guards.len());
        for ((key, delta, _), guard) in cells.iter().zip(guards.iter()) {
            let next = **guard + *delta;
            if next < Decimal::ZERO {
                return Err(DomainError::insufficient_stock(format!(
                    "{key}: on hand {on_hand}, requested delta {delta}",
                    on_hand = **guard,
                )));
            }
            updated.push(next);
        }

        let mut entries = Vec::with_capacity(guards.len());
        for ((key, _, _), (guard, next)) in
            cells.iter().zip(guards.iter_mut().zip(updated))
        {
            **guard = next;
            entries.push(StockEntry {
                key: key.clone(),
                quantity: next,
            });
        }
        debug!(keys = entries.len(), "adjustment batch applied");
        Ok(entries)
    }
}
