//! Common utilities shared across database drivers.
//!
//! - [`catalog`]: catalog count queries folded per dialect
//! - [`tls`]: TLS setup for PostgreSQL and MySQL connections
//! - [`types`]: type tokens spelled the same on every backend

pub mod catalog;
pub mod tls;
pub mod types;
