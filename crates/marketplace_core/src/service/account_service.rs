//! Account use-case service.
//!
//! # Invariants
//! - The plaintext password is dropped right after hashing and never persisted.
//! - Repository failures pass through the shared classifier.

use crate::assign::now_epoch_ms;
use crate::error::{classify, CoreError, CoreResult, ErrorKind};
use crate::model::account::{Account, NewAccount};
use crate::repo::account_repo::{AccountInsert, AccountRepository};
use crate::repo::RepoError;
use crate::service::credentials::{CredentialError, CredentialHasher};
use log::{info, warn};

/// Registration and lookup façade over an account repository.
pub struct AccountService<R: AccountRepository, H: CredentialHasher> {
    repo: R,
    hasher: H,
}

impl<R: AccountRepository, H: CredentialHasher> AccountService<R, H> {
    pub fn new(repo: R, hasher: H) -> Self {
        Self { repo, hasher }
    }

    /// Validates, hashes and persists a new account.
    pub fn register(&self, draft: NewAccount) -> CoreResult<Account> {
        draft.validate()?;

        let NewAccount {
            username,
            email,
            password,
        } = draft;
        let password_hash = self.hasher.hash(&password).map_err(credential_error)?;
        drop(password);

        let id = self
            .repo
            .insert_account(&AccountInsert {
                username: &username,
                email: &email,
                password_hash: &password_hash,
                registration_date: now_epoch_ms(),
            })
            .map_err(|err| repo_error("account_register", &err))?;

        info!("event=account_register module=account_service status=ok account_id={id}");
        self.repo
            .get_by_id(id)
            .map_err(|err| repo_error("account_register", &err))
    }

    pub fn get_by_username(&self, username: &str) -> CoreResult<Account> {
        self.repo
            .get_by_username(username)
            .map_err(|err| repo_error("account_get", &err))
    }

    pub fn find_by_email(&self, email: &str) -> CoreResult<Vec<Account>> {
        self.repo
            .get_by_email(email)
            .map_err(|err| repo_error("account_find", &err))
    }

    /// Checks `password` against the stored hash of `username`.
    pub fn verify_password(&self, username: &str, password: &str) -> CoreResult<bool> {
        let account = self.get_by_username(username)?;
        self.hasher
            .verify(password, &account.password_hash)
            .map_err(credential_error)
    }

    /// Returns the account registered under `email` whose hash matches `password`.
    ///
    /// `NotFound` when no account uses `email`; `Ok(None)` when none matches.
    pub fn authenticate_by_email(
        &self,
        email: &str,
        password: &str,
    ) -> CoreResult<Option<Account>> {
        let candidates = self.find_by_email(email)?;
        if candidates.is_empty() {
            return Err(CoreError::not_found(format!("no account for email {email}")));
        }

        for account in candidates {
            if self
                .hasher
                .verify(password, &account.password_hash)
                .map_err(credential_error)?
            {
                info!(
                    "event=account_authenticate module=account_service status=ok account_id={}",
                    account.id
                );
                return Ok(Some(account));
            }
        }
        info!("event=account_authenticate module=account_service status=rejected");
        Ok(None)
    }
}

fn repo_error(event: &str, err: &RepoError) -> CoreError {
    let classified = classify(err);
    warn!(
        "event={} module=account_service status=error error_kind={} error_code={}",
        event,
        classified.kind(),
        classified.code().unwrap_or("none")
    );
    classified
}

fn credential_error(err: CredentialError) -> CoreError {
    let kind = match err {
        CredentialError::InvalidCost(_) => ErrorKind::Validation,
        CredentialError::Hashing(_) | CredentialError::MalformedHash(_) => ErrorKind::Unknown,
    };
    CoreError::new(kind, err.to_string())
}
