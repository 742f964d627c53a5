//! Failure taxonomy and the shared persistence error classifier.
//!
//! # Responsibility
//! - Define the stable `ErrorKind` taxonomy every service error carries.
//! - Map opaque store failures to that taxonomy through one classifier
//!   shared by the item and account subsystems.
//!
//! # Invariants
//! - Callers of services never see raw driver errors, only `CoreError`.
//! - Classification only consults the `StoreFailure` capability, never a
//!   concrete driver error type.
//! - Validation failures are produced locally, before any store call.

use crate::model::account::AccountValidationError;
use crate::model::item::ItemValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CoreResult<T> = Result<T, CoreError>;

/// Stable failure kind exposed to callers of the core services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No row/document matched a key-based operation.
    NotFound,
    /// Uniqueness or referential failure reported by the store.
    ConstraintViolation,
    /// The store could not be reached, or the operation timed out or was cancelled.
    Connectivity,
    /// Anything the classifier could not inspect.
    Unknown,
    /// Malformed identifier, patch or draft rejected before any store call.
    Validation,
}

impl ErrorKind {
    /// Stable lowercase name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::ConstraintViolation => "constraint_violation",
            Self::Connectivity => "connectivity",
            Self::Unknown => "unknown",
            Self::Validation => "validation",
        }
    }

    /// HTTP status an outer layer should answer with for this kind.
    pub fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::ConstraintViolation => 409,
            Self::Validation => 400,
            Self::Connectivity => 502,
            Self::Unknown => 500,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse hint a store failure gives about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindHint {
    NoMatch,
    Constraint,
    Unreachable,
    TimedOut,
    Cancelled,
    Opaque,
}

/// Capability every store error type implements so it can be classified.
pub trait StoreFailure: Error {
    fn kind_hint(&self) -> KindHint;

    /// Native store code, e.g. a SQLite extended result code.
    fn code(&self) -> Option<String> {
        None
    }

    fn message(&self) -> String {
        self.to_string()
    }
}

/// Classified error returned by every core service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    kind: ErrorKind,
    code: Option<String>,
    message: String,
}

impl CoreError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({}): {}", self.kind, code, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl Error for CoreError {}

impl From<ItemValidationError> for CoreError {
    fn from(value: ItemValidationError) -> Self {
        Self::validation(value.to_string())
    }
}

impl From<AccountValidationError> for CoreError {
    fn from(value: AccountValidationError) -> Self {
        Self::validation(value.to_string())
    }
}

/// Maps a store hint onto the public taxonomy.
pub fn kind_for_hint(hint: KindHint) -> ErrorKind {
    match hint {
        KindHint::NoMatch => ErrorKind::NotFound,
        KindHint::Constraint => ErrorKind::ConstraintViolation,
        KindHint::Unreachable | KindHint::TimedOut | KindHint::Cancelled => {
            ErrorKind::Connectivity
        }
        KindHint::Opaque => ErrorKind::Unknown,
    }
}

/// Classifies a raw store failure into a `CoreError`.
///
/// The native code is kept for every kind so diagnostics survive the
/// translation; constraint violations always carry one when the store
/// reports it.
pub fn classify(failure: &dyn StoreFailure) -> CoreError {
    let kind = kind_for_hint(failure.kind_hint());
    let error = CoreError::new(kind, failure.message());
    match failure.code() {
        Some(code) => error.with_code(code),
        None => error,
    }
}
