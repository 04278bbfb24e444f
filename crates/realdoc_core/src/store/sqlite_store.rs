//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist documents as JSON bodies keyed by identity.
//! - Track a monotonically increasing revision per identity.
//!
//! # Invariants
//! - `insert` is an upsert; the revision is bumped on every write to the
//!   same identity.
//! - Decoded bodies are rejected, not masked, when they are not valid
//!   document JSON.

use crate::model::document::IDENTITY_FIELD;
use crate::model::value::AttrValue;
use crate::store::{Document, DocumentStore, InsertReceipt, StoreError, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Document store over an open, migrated SQLite connection.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn get(&self, id: &str) -> StoreResult<Option<Document>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE id = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(body) => {
                let document =
                    serde_json::from_str::<Document>(&body).map_err(|err| {
                        StoreError::InvalidData {
                            id: id.to_string(),
                            message: err.to_string(),
                        }
                    })?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    fn insert(&self, document: &Document) -> StoreResult<InsertReceipt> {
        let id = match document.get(IDENTITY_FIELD) {
            Some(AttrValue::Text(id)) if !id.is_empty() => id.clone(),
            _ => return Err(StoreError::MissingId),
        };

        let body = serde_json::to_string(document)?;

        let previous: Option<u64> = self
            .conn
            .query_row(
                "SELECT revision FROM documents WHERE id = ?1;",
                [id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let revision = previous.unwrap_or(0) + 1;

        self.conn.execute(
            "INSERT INTO documents (id, revision, body, updated_at)
             VALUES (?1, ?2, ?3, strftime('%s', 'now') * 1000)
             ON CONFLICT(id) DO UPDATE SET
                revision = excluded.revision,
                body = excluded.body,
                updated_at = excluded.updated_at;",
            params![id.as_str(), revision, body.as_str()],
        )?;

        Ok(InsertReceipt { id, revision })
    }
}
