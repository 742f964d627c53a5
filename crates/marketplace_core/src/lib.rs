//! Core domain logic for the marketplace backend.
//! Items live behind a cache-coherent service; accounts behind a relational repository.

pub mod assign;
pub mod cache;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use assign::{Assigner, PreparedBatch, SystemAssigner};
pub use cache::{CacheLookup, CacheStats, Generation, ItemCache, ItemSnapshot};
pub use config::CoreConfig;
pub use context::{CancelHandle, ContextError, OpContext};
pub use error::{classify, CoreError, CoreResult, ErrorKind, KindHint, StoreFailure};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{Account, AccountId, AccountValidationError, NewAccount};
pub use model::item::{
    parse_item_id, resolve_item_id, Item, ItemId, ItemPatch, ItemValidationError, NewItem,
};
pub use repo::account_repo::{AccountRepository, SqliteAccountRepository};
pub use repo::item_store::ItemStore;
pub use repo::memory_item_store::InMemoryItemStore;
pub use repo::sqlite_item_store::SqliteItemStore;
pub use repo::{RepoError, RepoResult};
pub use service::account_service::AccountService;
pub use service::credentials::{Argon2Hasher, CredentialError, CredentialHasher};
pub use service::item_service::{ItemService, DEFAULT_STORE_TIMEOUT};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
