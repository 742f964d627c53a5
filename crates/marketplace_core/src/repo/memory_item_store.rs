//! In-process item collection.
//!
//! Used for tests and for running the core without a database file.
//! Documents live in insertion order behind one `RwLock`.

use crate::context::OpContext;
use crate::model::item::{Item, ItemId, ItemPatch};
use crate::repo::item_store::ItemStore;
use crate::repo::{RepoError, RepoResult};
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

const ENTITY: &str = "item";

/// `ItemStore` backed by a process-local vector.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    docs: RwLock<Vec<Item>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `items`.
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            docs: RwLock::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ItemStore for InMemoryItemStore {
    type Error = RepoError;

    fn insert_many(&self, ctx: &OpContext, items: &[Item]) -> RepoResult<Vec<ItemId>> {
        ctx.check()?;
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);

        let mut seen: HashSet<ItemId> = docs.iter().map(|doc| doc.id).collect();
        for item in items {
            item.validate()
                .map_err(|err| RepoError::InvalidData(err.to_string()))?;
            if !seen.insert(item.id) {
                return Err(RepoError::Duplicate {
                    entity: ENTITY,
                    key: item.id.to_string(),
                });
            }
        }

        docs.extend_from_slice(items);
        Ok(items.iter().map(|item| item.id).collect())
    }

    fn find_all(&self, ctx: &OpContext) -> RepoResult<Vec<Item>> {
        ctx.check()?;
        let docs = self
            .docs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        ctx.check()?;
        Ok(docs)
    }

    fn update_one(&self, ctx: &OpContext, id: ItemId, patch: &ItemPatch) -> RepoResult<()> {
        ctx.check()?;
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        let doc = docs
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or_else(|| RepoError::not_found(ENTITY, id))?;
        patch.apply_to(doc);
        Ok(())
    }

    fn delete_one(&self, ctx: &OpContext, id: ItemId) -> RepoResult<()> {
        ctx.check()?;
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        let position = docs
            .iter()
            .position(|doc| doc.id == id)
            .ok_or_else(|| RepoError::not_found(ENTITY, id))?;
        docs.remove(position);
        Ok(())
    }
}
