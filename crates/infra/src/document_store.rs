use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use resortstock_core::{Document, DocumentStore, DomainError, DomainResult};

/// In-memory document collection for tests/dev.
///
/// Enforces the two uniqueness constraints every collection carries: one
/// document per id, one document per sequence number. A violated constraint
/// is an error, never a silent overwrite.
#[derive(Debug)]
pub struct InMemoryDocumentStore<D: Document> {
    docs: RwLock<HashMap<D::Id, D>>,
    numbers: RwLock<HashSet<String>>,
}

impl<D: Document> InMemoryDocumentStore<D> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
            numbers: RwLock::new(HashSet::new()),
        }
    }
}

impl<D: Document> Default for InMemoryDocumentStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> DocumentStore<D> for InMemoryDocumentStore<D>
where
    D: Document + Clone + Send + Sync,
    D::Id: Send + Sync,
{
    fn get(&self, id: &D::Id) -> Option<D> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        docs.get(id).cloned()
    }

    fn insert(&self, doc: D) -> DomainResult<()> {
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        let mut numbers = self.numbers.write().unwrap_or_else(PoisonError::into_inner);

        if docs.contains_key(&doc.id()) {
            return Err(DomainError::validation(format!(
                "document id already in use: {:?}",
                doc.id()
            )));
        }
        if !numbers.insert(doc.sequence_number().to_string()) {
            return Err(DomainError::duplicate_sequence_number(
                doc.sequence_number().to_string(),
            ));
        }
        docs.insert(doc.id(), doc);
        Ok(())
    }

    fn update(&self, doc: D) -> DomainResult<()> {
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        if !docs.contains_key(&doc.id()) {
            return Err(DomainError::NotFound);
        }
        docs.insert(doc.id(), doc);
        Ok(())
    }

    fn list(&self) -> Vec<D> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        docs.values().cloned().collect()
    }
}
