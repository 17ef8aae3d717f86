//! Database driver implementations.
//!
//! - [`hsql`]: HSQLDB dialect (generate-only)
//! - [`postgres`]: PostgreSQL dialect and connection
//! - [`mysql`]: MySQL/MariaDB dialect and connection
//! - [`common`]: shared utilities (TLS, common type tokens)
//!
//! # Dispatch
//!
//! The built-in dialects and connections form closed sets, so they are
//! wrapped in enums ([`DialectImpl`], [`ConnectionImpl`]) that forward each
//! trait method with a `match` instead of going through a vtable.
//!
//! # Adding New Databases
//!
//! 1. Create a new module under `drivers/`
//! 2. Implement `Dialect` (and `SchemaConnection` if a Rust client exists)
//! 3. Add enum variants to `DialectImpl` / `ConnectionImpl`
//! 4. Register the type identifiers in `DialectImpl::from_db_type`

pub mod common;
pub mod hsql;
pub mod mysql;
pub mod postgres;

#[cfg(test)]
mod live_tests;

pub use hsql::HsqlDialect;
pub use mysql::{MysqlConnection, MysqlDialect};
pub use postgres::{PostgresConnection, PostgresDialect};

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::core::identifier::CaseFolding;
use crate::core::schema::{Table, TableAttribute, TableAttributeType};
use crate::core::traits::{Dialect, PrimaryKeyLayout, SchemaConnection};
use crate::error::{MigrateError, Result};

/// Enum-based static dispatch for dialects.
#[derive(Debug, Clone)]
pub enum DialectImpl {
    Hsql(HsqlDialect),
    Postgres(PostgresDialect),
    Mysql(MysqlDialect),
}

macro_rules! dispatch {
    ($self:ident, $d:ident => $call:expr) => {
        match $self {
            DialectImpl::Hsql($d) => $call,
            DialectImpl::Postgres($d) => $call,
            DialectImpl::Mysql($d) => $call,
        }
    };
}

impl Dialect for DialectImpl {
    fn name(&self) -> &str {
        dispatch!(self, d => d.name())
    }

    fn case_folding(&self) -> CaseFolding {
        dispatch!(self, d => d.case_folding())
    }

    fn type_token(
        &self,
        attr_type: TableAttributeType,
        length: Option<u32>,
        precision_scale: Option<(u32, u32)>,
    ) -> String {
        dispatch!(self, d => d.type_token(attr_type, length, precision_scale))
    }

    fn column_type(&self, attr: &TableAttribute) -> String {
        dispatch!(self, d => d.column_type(attr))
    }

    fn primary_key_layout(&self, table: &Table) -> PrimaryKeyLayout {
        dispatch!(self, d => d.primary_key_layout(table))
    }

    fn inline_foreign_key(&self, attr: &TableAttribute) -> Option<String> {
        dispatch!(self, d => d.inline_foreign_key(attr))
    }

    fn foreign_key_name(&self, table: &str, attr: &TableAttribute) -> String {
        dispatch!(self, d => d.foreign_key_name(table, attr))
    }

    fn add_foreign_key(&self, table: &str, attr: &TableAttribute) -> Option<String> {
        dispatch!(self, d => d.add_foreign_key(table, attr))
    }

    fn rename_column(&self, table: &str, old_name: &str, new_name: &str) -> Result<String> {
        dispatch!(self, d => d.rename_column(table, old_name, new_name))
    }

    fn param_placeholder(&self, index: usize) -> String {
        dispatch!(self, d => d.param_placeholder(index))
    }

    fn table_exists_query(&self) -> String {
        dispatch!(self, d => d.table_exists_query())
    }

    fn column_exists_query(&self) -> String {
        dispatch!(self, d => d.column_exists_query())
    }

    fn constraint_exists_query(&self) -> String {
        dispatch!(self, d => d.constraint_exists_query())
    }

    fn row_count_query(&self, table: &str) -> String {
        dispatch!(self, d => d.row_count_query(table))
    }
}

impl DialectImpl {
    /// Create a dialect implementation from a database type string.
    ///
    /// # Errors
    ///
    /// Returns an error if the database type is not recognized.
    pub fn from_db_type(db_type: &str) -> Result<Self> {
        match db_type.to_lowercase().as_str() {
            "hsql" | "hsqldb" => Ok(DialectImpl::Hsql(HsqlDialect::new())),
            "postgres" | "postgresql" | "pg" => Ok(DialectImpl::Postgres(PostgresDialect::new())),
            "mysql" | "mariadb" => Ok(DialectImpl::Mysql(MysqlDialect::new())),
            other => Err(MigrateError::Config(format!(
                "Unknown database type: '{}'. Supported types: hsql, postgres, mysql",
                other
            ))),
        }
    }
}

/// Enum-based static dispatch for live connections.
pub enum ConnectionImpl {
    Postgres(PostgresConnection),
    Mysql(MysqlConnection),
}

impl ConnectionImpl {
    /// Open one connection for the configured database.
    ///
    /// # Errors
    ///
    /// `Config` for unknown types and for HSQLDB, which has no Rust client;
    /// `Pool` when the server cannot be reached.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        match DialectImpl::from_db_type(&config.r#type)? {
            DialectImpl::Postgres(_) => Ok(ConnectionImpl::Postgres(
                PostgresConnection::connect(config).await?,
            )),
            DialectImpl::Mysql(_) => Ok(ConnectionImpl::Mysql(
                MysqlConnection::connect(config).await?,
            )),
            DialectImpl::Hsql(_) => Err(MigrateError::Config(
                "hsql supports script generation only; no live connection is available".into(),
            )),
        }
    }
}

#[async_trait]
impl SchemaConnection for ConnectionImpl {
    fn db_type(&self) -> &str {
        match self {
            ConnectionImpl::Postgres(c) => c.db_type(),
            ConnectionImpl::Mysql(c) => c.db_type(),
        }
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        match self {
            ConnectionImpl::Postgres(c) => c.execute(sql).await,
            ConnectionImpl::Mysql(c) => c.execute(sql).await,
        }
    }

    async fn query_count(&self, sql: &str, params: &[String]) -> Result<i64> {
        match self {
            ConnectionImpl::Postgres(c) => c.query_count(sql, params).await,
            ConnectionImpl::Mysql(c) => c.query_count(sql, params).await,
        }
    }

    async fn ping(&self) -> Result<()> {
        match self {
            ConnectionImpl::Postgres(c) => c.ping().await,
            ConnectionImpl::Mysql(c) => c.ping().await,
        }
    }

    async fn close(&self) {
        match self {
            ConnectionImpl::Postgres(c) => c.close().await,
            ConnectionImpl::Mysql(c) => c.close().await,
        }
    }
}
