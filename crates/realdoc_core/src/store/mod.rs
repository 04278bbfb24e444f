//! Document store contract and persistence implementations.
//!
//! # Responsibility
//! - Define the two-operation store contract the model engine consumes.
//! - Isolate storage encoding details from the model layer.
//!
//! # Invariants
//! - `insert` requires a text `_id` field in the document.
//! - Store failures are typed results, never panics.

use crate::db::DbError;
use crate::model::value::AttrValue;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite_store;

pub use sqlite_store::SqliteDocumentStore;

/// Persisted document shape: attribute names to values.
pub type Document = BTreeMap<String, AttrValue>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from document store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying database or bootstrap error.
    Db(DbError),
    /// Inserted document carries no text `_id` field.
    MissingId,
    /// Document body cannot be encoded for storage.
    Encode(serde_json::Error),
    /// Persisted body cannot be decoded into a document.
    InvalidData { id: String, message: String },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingId => write!(f, "document has no `_id` field"),
            Self::Encode(err) => write!(f, "failed to encode document body: {err}"),
            Self::InvalidData { id, message } => {
                write!(f, "invalid persisted document `{id}`: {message}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::MissingId | Self::InvalidData { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Acknowledgment returned by a successful insert.
///
/// Re-inserting an existing identity bumps the revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertReceipt {
    pub id: String,
    pub revision: u64,
}

/// Two-operation store contract consumed by the model engine.
pub trait DocumentStore {
    /// Fetches the document persisted under `id`.
    fn get(&self, id: &str) -> StoreResult<Option<Document>>;

    /// Persists the document under its `_id` field.
    fn insert(&self, document: &Document) -> StoreResult<InsertReceipt>;
}
