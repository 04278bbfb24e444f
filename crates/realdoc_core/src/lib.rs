//! Core document-model engine for realty domain entities.
//! This crate is the single source of truth for model invariants:
//! declarative schemas, attribute gating, validation and persistence.

pub mod db;
pub mod logging;
pub mod model;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::{
    Model, SetError, IDENTITY_ATTRIBUTE, IDENTITY_FIELD, STORE_ERROR_KEY,
};
pub use model::filter::strip_tags;
pub use model::schema::{
    FilterBinding, FilterKind, ModelSchema, Rule, SchemaError, ValidatorKind, ValidatorSpec,
};
pub use model::validator::{ValidatorMap, ValidatorRegistry};
pub use model::value::AttrValue;
pub use store::{
    Document, DocumentStore, InsertReceipt, SqliteDocumentStore, StoreError, StoreResult,
};

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
