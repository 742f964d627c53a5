//! Repository layer: store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the item store contract the cache-coherent service consumes.
//! - Provide an in-memory and a SQLite-backed item document collection.
//! - Provide the relational account repository.
//!
//! # Invariants
//! - Store errors describe themselves through `StoreFailure`; services
//!   classify them before returning.
//! - Key-based writes that match nothing report `NotFound`, never success.

pub mod account_repo;
pub mod item_store;
pub mod memory_item_store;
pub mod sqlite_item_store;

use crate::context::ContextError;
use crate::db::DbError;
use crate::error::{KindHint, StoreFailure};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error shared by the bundled store implementations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound { entity: &'static str, key: String },
    Duplicate { entity: &'static str, key: String },
    InvalidData(String),
    Context(ContextError),
}

impl RepoError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Duplicate { entity, key } => write!(f, "duplicate {entity} key: {key}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Context(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Context(err) => Some(err),
            Self::NotFound { .. } | Self::Duplicate { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ContextError> for RepoError {
    fn from(value: ContextError) -> Self {
        Self::Context(value)
    }
}

impl StoreFailure for RepoError {
    fn kind_hint(&self) -> KindHint {
        match self {
            Self::Db(err) => err.kind_hint(),
            Self::NotFound { .. } => KindHint::NoMatch,
            Self::Duplicate { .. } => KindHint::Constraint,
            Self::InvalidData(_) => KindHint::Opaque,
            Self::Context(err) => err.kind_hint(),
        }
    }

    fn code(&self) -> Option<String> {
        match self {
            Self::Db(err) => err.code(),
            Self::Duplicate { .. } => Some("duplicate_key".to_string()),
            Self::Context(err) => err.code(),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Db(err) => err.message(),
            other => other.to_string(),
        }
    }
}
