//! SQLite-backed item document collection.
//!
//! # Responsibility
//! - Persist items as JSON documents in the `items` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Batch inserts run in one transaction; a failure leaves no row behind.
//! - Patches are merged into the stored document; `id`/`createdAt` never change.
//! - Read paths reject documents that fail decoding or validation.

use crate::context::OpContext;
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::item::{Item, ItemId, ItemPatch};
use crate::repo::item_store::ItemStore;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

const ENTITY: &str = "item";

/// `ItemStore` over a single SQLite connection.
///
/// The connection is serialized behind a mutex; concurrent callers queue on it.
pub struct SqliteItemStore {
    conn: Mutex<Connection>,
}

impl SqliteItemStore {
    /// Wraps a migrated/ready connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement drops its transaction, which rolls back.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ItemStore for SqliteItemStore {
    type Error = RepoError;

    fn insert_many(&self, ctx: &OpContext, items: &[Item]) -> RepoResult<Vec<ItemId>> {
        ctx.check()?;
        let mut conn = self.lock();
        ctx.check()?;

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO items (id, document, created_at) VALUES (?1, ?2, ?3);",
            )?;
            for item in items {
                item.validate()
                    .map_err(|err| RepoError::InvalidData(err.to_string()))?;
                stmt.execute(params![
                    item.id.to_string(),
                    encode_document(item)?,
                    item.created_at,
                ])?;
            }
        }
        tx.commit()?;

        Ok(items.iter().map(|item| item.id).collect())
    }

    fn find_all(&self, ctx: &OpContext) -> RepoResult<Vec<Item>> {
        ctx.check()?;
        let conn = self.lock();
        ctx.check()?;

        let mut stmt = conn.prepare("SELECT id, document FROM items ORDER BY seq ASC;")?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        drop(rows);
        drop(stmt);
        drop(conn);

        ctx.check()?;
        Ok(items)
    }

    fn update_one(&self, ctx: &OpContext, id: ItemId, patch: &ItemPatch) -> RepoResult<()> {
        ctx.check()?;
        let mut conn = self.lock();
        ctx.check()?;

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let document: Option<String> = tx
            .query_row(
                "SELECT document FROM items WHERE id = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let document = document.ok_or_else(|| RepoError::not_found(ENTITY, id))?;

        let mut item = decode_document(&document)?;
        patch.apply_to(&mut item);
        tx.execute(
            "UPDATE items SET document = ?2 WHERE id = ?1;",
            params![id.to_string(), encode_document(&item)?],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_one(&self, ctx: &OpContext, id: ItemId) -> RepoResult<()> {
        ctx.check()?;
        let conn = self.lock();
        ctx.check()?;

        let changed = conn.execute("DELETE FROM items WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(ENTITY, id));
        }
        Ok(())
    }
}

fn encode_document(item: &Item) -> RepoResult<String> {
    serde_json::to_string(item)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode item {}: {err}", item.id)))
}

fn decode_document(document: &str) -> RepoResult<Item> {
    let item: Item = serde_json::from_str(document)
        .map_err(|err| RepoError::InvalidData(format!("undecodable item document: {err}")))?;
    item.validate()
        .map_err(|err| RepoError::InvalidData(format!("invalid item document: {err}")))?;
    Ok(item)
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id_text: String = row.get("id")?;
    let document: String = row.get("document")?;
    let item = decode_document(&document)?;
    if item.id.to_string() != id_text {
        return Err(RepoError::InvalidData(format!(
            "document id `{}` does not match items.id `{id_text}`",
            item.id
        )));
    }
    Ok(item)
}
