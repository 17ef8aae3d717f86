//! Core abstractions for dialect-neutral schema migration.
//!
//! This module provides the foundational types and traits used throughout
//! the engine:
//!
//! - [`schema`]: Table and attribute definitions (the schema model)
//! - [`identifier`]: Identifier validation and catalog case folding
//! - [`traits`]: The [`Dialect`] strategy and the [`SchemaConnection`] collaborator
//!
//! # Architecture
//!
//! The core module defines backend-agnostic abstractions that are implemented
//! by driver modules (`drivers/hsql`, `drivers/postgres`, `drivers/mysql`).
//! Data flows one way: the schema model feeds the statement builder, the
//! dialect is consulted by the builder and the introspector, and only the
//! executor touches a [`SchemaConnection`].

pub mod identifier;
pub mod schema;
pub mod traits;

// Re-export commonly used types for convenience
pub use identifier::{validate_identifier, CaseFolding};
pub use schema::{ForeignKeyRef, Table, TableAttribute, TableAttributeType, TableBuilder};
pub use traits::{
    identity_candidate, Dialect, PrimaryKeyLayout, SchemaConnection, DEFAULT_DECIMAL,
    DEFAULT_VARCHAR_LENGTH,
};
