//! Document trait and the persistence seam for workflow documents.

use core::fmt::Debug;
use core::hash::Hash;
use std::sync::Arc;

use crate::error::DomainResult;

/// Marker + minimal interface for persisted workflow documents.
///
/// This is intentionally small so modules can decide how they model state
/// transitions without bringing in any infrastructure concerns.
pub trait Document {
    /// Strongly-typed document identifier.
    type Id: Copy + Eq + Hash + Debug;

    /// Returns the document identifier.
    fn id(&self) -> Self::Id;

    /// Human-readable sequence number (`REQ-…`, `PO-…`, `GRN-…`, `CNS-…`).
    ///
    /// Unique per document kind; stores enforce this at insert time.
    fn sequence_number(&self) -> &str;
}

/// Keyed store abstraction for one document collection.
///
/// Engines receive typed store handles at construction time; there is no
/// process-wide model registry. Implementations must uphold:
///
/// - `insert` rejects an already-used id (`Validation`) or sequence number
///   (`DuplicateSequenceNumber`) rather than overwriting.
/// - `update` rejects unknown ids (`NotFound`).
pub trait DocumentStore<D: Document>: Send + Sync {
    fn get(&self, id: &D::Id) -> Option<D>;
    fn insert(&self, doc: D) -> DomainResult<()>;
    fn update(&self, doc: D) -> DomainResult<()>;
    fn list(&self) -> Vec<D>;
}

impl<D, S> DocumentStore<D> for Arc<S>
where
    D: Document,
    S: DocumentStore<D> + ?Sized,
{
    fn get(&self, id: &D::Id) -> Option<D> {
        (**self).get(id)
    }

    fn insert(&self, doc: D) -> DomainResult<()> {
        (**self).insert(doc)
    }

    fn update(&self, doc: D) -> DomainResult<()> {
        (**self).update(doc)
    }

    fn list(&self) -> Vec<D> {
        (**self).list()
    }
}
