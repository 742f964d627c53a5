//! Account repository contract and SQLite implementation.
//!
//! # Invariants
//! - Only already-hashed credentials reach this layer.
//! - Username uniqueness is enforced by the schema, surfaced as a constraint failure.

use crate::model::account::{Account, AccountId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "account";

const ACCOUNT_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    password_hash,
    registration_date
FROM accounts";

/// Account row ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInsert<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub registration_date: i64,
}

/// Repository interface for account persistence.
pub trait AccountRepository {
    fn insert_account(&self, account: &AccountInsert<'_>) -> RepoResult<AccountId>;
    fn get_by_id(&self, id: AccountId) -> RepoResult<Account>;
    fn get_by_username(&self, username: &str) -> RepoResult<Account>;
    fn get_by_email(&self, email: &str) -> RepoResult<Vec<Account>>;
}

/// SQLite-backed account repository.
pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn insert_account(&self, account: &AccountInsert<'_>) -> RepoResult<AccountId> {
        if account.password_hash.is_empty() {
            return Err(RepoError::InvalidData(
                "refusing to store an empty password hash".to_string(),
            ));
        }

        let id = self.conn.query_row(
            "INSERT INTO accounts (username, password_hash, email, registration_date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id;",
            params![
                account.username,
                account.password_hash,
                account.email,
                account.registration_date,
            ],
            |row| row.get::<_, AccountId>(0),
        )?;
        Ok(id)
    }

    fn get_by_id(&self, id: AccountId) -> RepoResult<Account> {
        self.conn
            .query_row(
                &format!("{ACCOUNT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_account_row,
            )
            .optional()?
            .ok_or_else(|| RepoError::not_found(ENTITY, id))
    }

    fn get_by_username(&self, username: &str) -> RepoResult<Account> {
        self.conn
            .query_row(
                &format!("{ACCOUNT_SELECT_SQL} WHERE username = ?1;"),
                [username],
                parse_account_row,
            )
            .optional()?
            .ok_or_else(|| RepoError::not_found(ENTITY, username))
    }

    fn get_by_email(&self, email: &str) -> RepoResult<Vec<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACCOUNT_SELECT_SQL} WHERE email = ?1 ORDER BY id ASC;"))?;
        let accounts = stmt
            .query_map([email], parse_account_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(accounts)
    }
}

fn parse_account_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        registration_date: row.get("registration_date")?,
    })
}
