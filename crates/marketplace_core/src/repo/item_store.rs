//! Item store contract (the document collection behind the item cache).
//!
//! # Invariants
//! - `insert_many` is all-or-nothing: on error no item of the batch is stored.
//! - `find_all` returns the whole collection in insertion order.
//! - `update_one`/`delete_one` touch exactly one document or fail with a
//!   `NoMatch` failure.
//! - Implementations check the context before issuing I/O.

use crate::context::OpContext;
use crate::error::StoreFailure;
use crate::model::item::{Item, ItemId, ItemPatch};
use std::sync::Arc;

/// Handle to the backing item collection.
pub trait ItemStore: Send + Sync {
    type Error: StoreFailure + Send + Sync + 'static;

    /// Inserts a fully stamped batch and returns the stored ids in order.
    fn insert_many(&self, ctx: &OpContext, items: &[Item]) -> Result<Vec<ItemId>, Self::Error>;

    fn find_all(&self, ctx: &OpContext) -> Result<Vec<Item>, Self::Error>;

    fn update_one(&self, ctx: &OpContext, id: ItemId, patch: &ItemPatch)
        -> Result<(), Self::Error>;

    fn delete_one(&self, ctx: &OpContext, id: ItemId) -> Result<(), Self::Error>;
}

impl<S: ItemStore + ?Sized> ItemStore for Arc<S> {
    type Error = S::Error;

    fn insert_many(&self, ctx: &OpContext, items: &[Item]) -> Result<Vec<ItemId>, Self::Error> {
        (**self).insert_many(ctx, items)
    }

    fn find_all(&self, ctx: &OpContext) -> Result<Vec<Item>, Self::Error> {
        (**self).find_all(ctx)
    }

    fn update_one(
        &self,
        ctx: &OpContext,
        id: ItemId,
        patch: &ItemPatch,
    ) -> Result<(), Self::Error> {
        (**self).update_one(ctx, id, patch)
    }

    fn delete_one(&self, ctx: &OpContext, id: ItemId) -> Result<(), Self::Error> {
        (**self).delete_one(ctx, id)
    }
}
