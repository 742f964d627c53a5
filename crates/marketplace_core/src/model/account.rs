//! Account domain model.
//!
//! # Invariants
//! - `password_hash` is never serialized outward and never empty once stored.
//! - Plaintext passwords only live in `NewAccount` until hashing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").expect("valid username regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

const MIN_PASSWORD_CHARS: usize = 8;

/// Relational-store-assigned account identifier.
pub type AccountId = i64;

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Unix epoch milliseconds.
    pub registration_date: i64,
}

/// Registration input; holds the plaintext password until it is hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl NewAccount {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if !USERNAME_RE.is_match(&self.username) {
            return Err(AccountValidationError::InvalidUsername(self.username.clone()));
        }
        if !EMAIL_RE.is_match(&self.email) {
            return Err(AccountValidationError::InvalidEmail(self.email.clone()));
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AccountValidationError::PasswordTooShort {
                min: MIN_PASSWORD_CHARS,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    InvalidUsername(String),
    InvalidEmail(String),
    PasswordTooShort { min: usize },
}

impl Display for AccountValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername(value) => write!(f, "invalid username `{value}`"),
            Self::InvalidEmail(value) => write!(f, "invalid email `{value}`"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must have at least {min} characters")
            }
        }
    }
}

impl Error for AccountValidationError {}
