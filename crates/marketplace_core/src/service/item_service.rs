//! Cache-coherent item service.
//!
//! # Responsibility
//! - Combine the assigner, an `ItemStore` and the `ItemCache` into the
//!   create-batch / list / update / delete use-cases.
//! - Classify every store failure before it leaves the service.
//!
//! # Invariants
//! - Invalidate-on-write: every write the store confirms is followed by
//!   `invalidate()` before the call returns success.
//! - Populate-on-miss: `list` fetches from the store only when the cache is
//!   absent, and only installs a snapshot no write has overtaken.
//! - Failed writes leave the cache exactly as it was.
//! - No store call happens while a cache lock is held.
//! - Nothing here retries; retry policy belongs to callers.

use crate::assign::{Assigner, PreparedBatch, SystemAssigner};
use crate::cache::{CacheLookup, ItemCache, ItemSnapshot};
use crate::context::OpContext;
use crate::error::{classify, CoreError, CoreResult, ErrorKind, StoreFailure};
use crate::model::item::{resolve_item_id, ItemId, ItemPatch, NewItem};
use crate::repo::item_store::ItemStore;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default bound for a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Item façade owning the process-wide item cache.
pub struct ItemService<S: ItemStore, A: Assigner = SystemAssigner> {
    store: S,
    assigner: A,
    cache: ItemCache,
    store_timeout: Duration,
}

impl<S: ItemStore> ItemService<S> {
    /// Creates a service with the system assigner and an absent cache.
    pub fn new(store: S) -> Self {
        Self::with_assigner(store, SystemAssigner)
    }
}

impl<S: ItemStore, A: Assigner> ItemService<S, A> {
    pub fn with_assigner(store: S, assigner: A) -> Self {
        Self {
            store,
            assigner,
            cache: ItemCache::new(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Bounds every store call issued through the context-less entry points.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn cache(&self) -> &ItemCache {
        &self.cache
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn context(&self) -> OpContext {
        OpContext::with_timeout(self.store_timeout)
    }

    /// Validates and stamps drafts exactly once.
    ///
    /// The returned batch can be submitted (and resubmitted) with
    /// `insert_prepared` without ever receiving new identifiers.
    pub fn prepare_batch(&self, drafts: &[NewItem]) -> CoreResult<PreparedBatch> {
        for draft in drafts {
            draft.validate()?;
        }
        Ok(PreparedBatch::new(&self.assigner, drafts))
    }

    /// Creates all drafts as one all-or-nothing batch.
    ///
    /// Returns the assigned identifiers in submission order.
    pub fn create_many(&self, drafts: &[NewItem]) -> CoreResult<Vec<ItemId>> {
        self.create_many_with_context(&self.context(), drafts)
    }

    pub fn create_many_with_context(
        &self,
        ctx: &OpContext,
        drafts: &[NewItem],
    ) -> CoreResult<Vec<ItemId>> {
        let batch = self.prepare_batch(drafts)?;
        self.insert_prepared_with_context(ctx, &batch)
    }

    pub fn insert_prepared(&self, batch: &PreparedBatch) -> CoreResult<Vec<ItemId>> {
        self.insert_prepared_with_context(&self.context(), batch)
    }

    pub fn insert_prepared_with_context(
        &self,
        ctx: &OpContext,
        batch: &PreparedBatch,
    ) -> CoreResult<Vec<ItemId>> {
        if batch.is_empty() {
            debug!("event=item_create module=item_service status=ok count=0");
            return Ok(Vec::new());
        }

        let started_at = Instant::now();
        let stored = self
            .store
            .insert_many(ctx, batch.items())
            .map_err(|err| store_error("item_create", started_at, &err))?;
        self.cache.invalidate();

        let assigned = batch.ids();
        if stored != assigned {
            warn!(
                "event=item_create module=item_service status=error error_kind=unknown reason=id_mismatch count={}",
                batch.len()
            );
            return Err(CoreError::new(
                ErrorKind::Unknown,
                "store reported identifiers that differ from the assigned ones",
            ));
        }

        info!(
            "event=item_create module=item_service status=ok count={} duration_ms={}",
            batch.len(),
            started_at.elapsed().as_millis()
        );
        Ok(assigned)
    }

    /// Returns every item, from the cache when populated.
    pub fn list(&self) -> CoreResult<ItemSnapshot> {
        self.list_with_context(&self.context())
    }

    pub fn list_with_context(&self, ctx: &OpContext) -> CoreResult<ItemSnapshot> {
        let observed = match self.cache.lookup() {
            CacheLookup::Hit(snapshot) => {
                debug!(
                    "event=item_list module=item_service status=hit count={}",
                    snapshot.len()
                );
                return Ok(snapshot);
            }
            CacheLookup::Miss(generation) => generation,
        };

        let started_at = Instant::now();
        let items = self
            .store
            .find_all(ctx)
            .map_err(|err| store_error("item_list", started_at, &err))?;
        let snapshot: ItemSnapshot = Arc::from(items);
        let installed = self.cache.populate_from(Arc::clone(&snapshot), observed);

        info!(
            "event=item_list module=item_service status=miss count={} installed={} duration_ms={}",
            snapshot.len(),
            installed,
            started_at.elapsed().as_millis()
        );
        Ok(snapshot)
    }

    /// Applies a partial update to the item identified by `id`.
    pub fn update(&self, id: &str, patch: &ItemPatch) -> CoreResult<()> {
        self.update_with_context(&self.context(), id, patch)
    }

    pub fn update_with_context(
        &self,
        ctx: &OpContext,
        id: &str,
        patch: &ItemPatch,
    ) -> CoreResult<()> {
        let id = resolve_id(id)?;
        patch.validate()?;

        let started_at = Instant::now();
        self.store
            .update_one(ctx, id, patch)
            .map_err(|err| store_error("item_update", started_at, &err))?;
        self.cache.invalidate();

        info!(
            "event=item_update module=item_service status=ok item_id={} duration_ms={}",
            id,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Removes the item identified by `id`.
    pub fn delete(&self, id: &str) -> CoreResult<()> {
        self.delete_with_context(&self.context(), id)
    }

    pub fn delete_with_context(&self, ctx: &OpContext, id: &str) -> CoreResult<()> {
        let id = resolve_id(id)?;

        let started_at = Instant::now();
        self.store
            .delete_one(ctx, id)
            .map_err(|err| store_error("item_delete", started_at, &err))?;
        self.cache.invalidate();

        info!(
            "event=item_delete module=item_service status=ok item_id={} duration_ms={}",
            id,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

/// Text that can never name an item answers `NotFound` without a store call.
fn resolve_id(raw: &str) -> CoreResult<ItemId> {
    resolve_item_id(raw)?.ok_or_else(|| {
        debug!("event=item_lookup module=item_service status=error error_kind=not_found reason=unassignable_id");
        CoreError::not_found(format!("item not found: {}", raw.trim()))
    })
}

fn store_error(event: &str, started_at: Instant, err: &dyn StoreFailure) -> CoreError {
    let classified = classify(err);
    warn!(
        "event={} module=item_service status=error error_kind={} error_code={} duration_ms={}",
        event,
        classified.kind(),
        classified.code().unwrap_or("none"),
        started_at.elapsed().as_millis()
    );
    classified
}
