//! Identity and timestamp assignment for new items.
//!
//! # Invariants
//! - `assign` never mutates its input; it returns a fresh `Item`.
//! - Each call yields an identifier never produced before by this process.
//! - A stamped batch is reused as-is on retry; drafts are never re-stamped.

use crate::model::item::{Item, ItemId, NewItem};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Produces identity and creation time for a draft item.
pub trait Assigner: Send + Sync {
    fn assign(&self, draft: &NewItem) -> Item;
}

/// Default assigner: random v4 UUIDs and wall-clock milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAssigner;

impl Assigner for SystemAssigner {
    fn assign(&self, draft: &NewItem) -> Item {
        stamp(draft, Uuid::new_v4(), now_epoch_ms())
    }
}

/// Builds a persisted-shape item from a draft with the given identity.
pub fn stamp(draft: &NewItem, id: ItemId, created_at: i64) -> Item {
    Item {
        id,
        name: draft.name.clone(),
        description: draft.description.clone(),
        image_url: draft.image_url.clone(),
        owner: draft.owner.clone(),
        created_at,
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Drafts stamped exactly once, ready for (re-)submission to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedBatch {
    items: Vec<Item>,
}

impl PreparedBatch {
    pub fn new(assigner: &dyn Assigner, drafts: &[NewItem]) -> Self {
        Self {
            items: drafts.iter().map(|draft| assigner.assign(draft)).collect(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Assigned identifiers in submission order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{now_epoch_ms, Assigner, PreparedBatch, SystemAssigner};
    use crate::model::item::NewItem;
    use std::collections::HashSet;

    #[test]
    fn assign_copies_draft_fields_and_stamps_identity() {
        let draft = NewItem::new("A").with_owner("alice");
        let before = now_epoch_ms();
        let item = SystemAssigner.assign(&draft);

        assert!(!item.id.is_nil());
        assert!(item.created_at >= before);
        assert_eq!(item.name, "A");
        assert_eq!(item.owner, "alice");
        assert_eq!(draft, NewItem::new("A").with_owner("alice"));
    }

    #[test]
    fn batch_ids_are_distinct_and_ordered() {
        let drafts: Vec<NewItem> = (0..64).map(|n| NewItem::new(format!("item-{n}"))).collect();
        let batch = PreparedBatch::new(&SystemAssigner, &drafts);

        let ids = batch.ids();
        assert_eq!(ids.len(), 64);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 64);
        for (item, draft) in batch.items().iter().zip(&drafts) {
            assert_eq!(item.name, draft.name);
        }
    }
}
