//! # ddl-migrate
//!
//! Dialect-aware schema migration and DDL generation.
//!
//! This library turns a dialect-neutral description of tables and columns
//! into exact DDL for several relational backends, and applies ordered schema
//! changes to a live database safely:
//!
//! - **Dialects** for HSQLDB, PostgreSQL and MySQL/MariaDB (type names,
//!   identity columns, primary-key placement, rename syntax)
//! - **Deterministic statements** suitable for diffing and audit logs
//! - **Idempotent steps**: catalog introspection decides whether a change is
//!   already applied
//! - **Data safety**: tables that still hold rows are never dropped
//!
//! ## Example
//!
//! ```rust,no_run
//! use ddl_migrate::{Config, ConnectionImpl, MigrationExecutor, MigrationPlan};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> ddl_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let plan = MigrationPlan::load("plan.yaml")?;
//!     let executor = MigrationExecutor::from_config(&config)?;
//!     let conn = ConnectionImpl::connect(&config.database).await?;
//!     let report = executor.run(conn, &plan.steps).await?;
//!     println!("{} applied, {} skipped", report.applied(), report.skipped());
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod executor;
pub mod introspect;
pub mod plan;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use builder::{
    build_add_columns, build_add_unique_constraint, build_create_table, build_drop_column,
    build_drop_table, build_rename_column, DdlLine, DdlScript,
};
pub use config::{Config, ConstraintPolicy, DatabaseConfig, MigrationOptions, SslMode};
pub use crate::core::{
    CaseFolding, Dialect, ForeignKeyRef, SchemaConnection, Table, TableAttribute,
    TableAttributeType, TableBuilder,
};
pub use drivers::{ConnectionImpl, DialectImpl};
pub use error::{MigrateError, Result};
pub use executor::{
    FailureKind, MigrationExecutor, MigrationReport, MigrationStep, StepOutcome, StepReport,
    StepState,
};
pub use introspect::SchemaIntrospector;
pub use plan::MigrationPlan;
