use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{Cat, CatFilter, CatId, CatPatch, CatRecord, CatStore, StoreError};
use crate::capability::WriteCap;

/// In-memory cat collection.
///
/// Documents are kept in insertion order, which is also the order
/// `find_all` and `find` return them in. The lock is held only for the
/// duration of a single call.
#[derive(Debug, Default)]
pub struct InMemoryCatStore {
    docs: RwLock<Vec<Cat>>,
    reject_writes: AtomicBool,
}

impl InMemoryCatStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with `StoreError::Rejected`.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Returns the number of stored documents.
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            Err(StoreError::Rejected("write rejected by store".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatStore for InMemoryCatStore {
    async fn find_all(&self) -> Result<Vec<Cat>, StoreError> {
        Ok(self.docs.read().clone())
    }

    async fn find_by_id(&self, id: &CatId) -> Result<Option<Cat>, StoreError> {
        Ok(self.docs.read().iter().find(|c| &c.id == id).cloned())
    }

    async fn find(&self, filter: &CatFilter) -> Result<Vec<Cat>, StoreError> {
        Ok(self
            .docs
            .read()
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn insert(&self, _cap: &WriteCap, record: CatRecord) -> Result<Cat, StoreError> {
        self.check_writable()?;
        let cat = record.with_id(CatId::new(Uuid::new_v4().to_string()));
        self.docs.write().push(cat.clone());
        Ok(cat)
    }

    async fn find_and_update(
        &self,
        _cap: &WriteCap,
        id: &CatId,
        patch: &CatPatch,
    ) -> Result<Option<Cat>, StoreError> {
        self.check_writable()?;
        let mut docs = self.docs.write();
        Ok(docs.iter_mut().find(|c| &c.id == id).map(|cat| {
            patch.apply(cat);
            cat.clone()
        }))
    }

    async fn find_and_delete(&self, _cap: &WriteCap, id: &CatId) -> Result<Option<Cat>, StoreError> {
        self.check_writable()?;
        let mut docs = self.docs.write();
        Ok(docs
            .iter()
            .position(|c| &c.id == id)
            .map(|idx| docs.remove(idx)))
    }
}
