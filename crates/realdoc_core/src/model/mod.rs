//! Model engine: declarative schemas, gated attributes, validation and
//! the persistence lifecycle.
//!
//! # Responsibility
//! - Define the schema descriptor contract concrete model types supply.
//! - Run the defaulting, gating, filtering and validation policies that
//!   compose into the save/load lifecycle.
//!
//! # Invariants
//! - The declared attribute list is the entire normal write surface.
//! - Validator registry keys are always declared attribute names.

pub mod document;
pub mod filter;
pub mod schema;
pub mod validator;
pub mod value;
