#![allow(dead_code)]

use marketplace_core::{
    InMemoryItemStore, Item, ItemId, ItemPatch, ItemStore, KindHint, OpContext, RepoError,
    StoreFailure,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Failure produced either by the wrapped store or by injection.
#[derive(Debug)]
pub enum FakeError {
    Inner(RepoError),
    Injected(KindHint),
}

impl Display for FakeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inner(err) => write!(f, "{err}"),
            Self::Injected(hint) => write!(f, "injected failure {hint:?}"),
        }
    }
}

impl Error for FakeError {}

impl StoreFailure for FakeError {
    fn kind_hint(&self) -> KindHint {
        match self {
            Self::Inner(err) => err.kind_hint(),
            Self::Injected(hint) => *hint,
        }
    }

    fn code(&self) -> Option<String> {
        match self {
            Self::Inner(err) => err.code(),
            Self::Injected(KindHint::Constraint) => Some("E11000".to_string()),
            Self::Injected(_) => None,
        }
    }
}

/// In-memory store that counts calls and can fail or stall on demand.
#[derive(Default)]
pub struct CountingStore {
    inner: InMemoryItemStore,
    inserts: AtomicUsize,
    finds: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
    fail_next: Mutex<Option<KindHint>>,
    find_delay: Option<Duration>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `find_all` sleeps for `delay` before reading.
    pub fn with_find_delay(delay: Duration) -> Self {
        Self {
            find_delay: Some(delay),
            ..Self::default()
        }
    }

    /// The next store call of any kind fails with `hint`.
    pub fn fail_next(&self, hint: KindHint) {
        *self.fail_next.lock().unwrap() = Some(hint);
    }

    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn find_calls(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> usize {
        self.inner.len()
    }

    fn injected(&self) -> Result<(), FakeError> {
        match self.fail_next.lock().unwrap().take() {
            Some(hint) => Err(FakeError::Injected(hint)),
            None => Ok(()),
        }
    }
}

impl ItemStore for CountingStore {
    type Error = FakeError;

    fn insert_many(&self, ctx: &OpContext, items: &[Item]) -> Result<Vec<ItemId>, FakeError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        self.inner.insert_many(ctx, items).map_err(FakeError::Inner)
    }

    fn find_all(&self, ctx: &OpContext) -> Result<Vec<Item>, FakeError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        if let Some(delay) = self.find_delay {
            std::thread::sleep(delay);
        }
        self.inner.find_all(ctx).map_err(FakeError::Inner)
    }

    fn update_one(&self, ctx: &OpContext, id: ItemId, patch: &ItemPatch) -> Result<(), FakeError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        self.inner.update_one(ctx, id, patch).map_err(FakeError::Inner)
    }

    fn delete_one(&self, ctx: &OpContext, id: ItemId) -> Result<(), FakeError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        self.inner.delete_one(ctx, id).map_err(FakeError::Inner)
    }
}

/// Store that persists normally but reports the assigned ids reversed.
#[derive(Default)]
pub struct ReorderingStore {
    inner: InMemoryItemStore,
}

impl ItemStore for ReorderingStore {
    type Error = RepoError;

    fn insert_many(&self, ctx: &OpContext, items: &[Item]) -> Result<Vec<ItemId>, RepoError> {
        let mut ids = self.inner.insert_many(ctx, items)?;
        ids.reverse();
        Ok(ids)
    }

    fn find_all(&self, ctx: &OpContext) -> Result<Vec<Item>, RepoError> {
        self.inner.find_all(ctx)
    }

    fn update_one(&self, ctx: &OpContext, id: ItemId, patch: &ItemPatch) -> Result<(), RepoError> {
        self.inner.update_one(ctx, id, patch)
    }

    fn delete_one(&self, ctx: &OpContext, id: ItemId) -> Result<(), RepoError> {
        self.inner.delete_one(ctx, id)
    }
}
