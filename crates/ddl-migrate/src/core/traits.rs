//! Core traits for dialect-aware DDL generation and execution.
//!
//! - [`Dialect`]: SQL syntax strategy for one backend (type mapping,
//!   primary-key syntax, foreign-key syntax, rename syntax, introspection
//!   queries)
//! - [`SchemaConnection`]: the live connection the executor runs DDL and
//!   catalog queries on
//!
//! # Design Patterns
//!
//! - **Strategy**: each backend implements [`Dialect`]; the statement builder
//!   only talks to the trait, so adding a backend never touches the builder
//! - **Template Method**: default trait methods define the common rendering
//!   (foreign keys, trailing primary keys, row counts); dialects override only
//!   what differs

use async_trait::async_trait;

use super::identifier::CaseFolding;
use super::schema::{Table, TableAttribute, TableAttributeType};
use crate::error::Result;

/// Default DECIMAL precision/scale when an attribute declares none.
pub const DEFAULT_DECIMAL: (u32, u32) = (19, 2);

/// Default VARCHAR length when an attribute declares none.
pub const DEFAULT_VARCHAR_LENGTH: u32 = 255;

/// Where and how a table's primary key is declared in CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrimaryKeyLayout {
    /// Key column that carries an inline clause, and the clause itself
    /// (identity / auto-increment / inline PRIMARY KEY).
    pub inline: Option<(String, String)>,

    /// Columns listed in a trailing `PRIMARY KEY (...)` clause.
    pub trailing: Vec<String>,
}

impl PrimaryKeyLayout {
    /// Trailing `PRIMARY KEY (...)` clause over every key column.
    pub fn trailing(table: &Table) -> Self {
        Self {
            inline: None,
            trailing: table
                .primary_key()
                .iter()
                .map(|a| a.name().to_string())
                .collect(),
        }
    }

    /// Inline clause for the given column, if it carries one.
    pub fn inline_clause(&self, column: &str) -> Option<&str> {
        self.inline
            .as_ref()
            .filter(|(name, _)| name == column)
            .map(|(_, clause)| clause.as_str())
    }

    /// Whether the trailing clause covers this column.
    pub fn covers(&self, column: &str) -> bool {
        self.trailing.iter().any(|c| c == column)
    }
}

/// The single integral key column of a non-composite table, if any.
///
/// This is the column dialects turn into an identity/auto-increment column.
pub fn identity_candidate(table: &Table) -> Option<&TableAttribute> {
    let pk = table.primary_key();
    match pk.as_slice() {
        [only] if !table.is_composite_key() && only.attr_type().is_integral() => Some(*only),
        _ => None,
    }
}

/// SQL syntax strategy for different database engines.
///
/// Provides backend-specific DDL syntax while keeping the statement builder
/// and the executor backend-agnostic.
///
/// # Dispatch
///
/// The closed set of built-in dialects is the `DialectImpl` enum in the
/// `drivers` module, which forwards every method with a plain `match`.
pub trait Dialect: Send + Sync {
    /// Get the dialect identifier (e.g., "hsql", "postgres", "mysql").
    fn name(&self) -> &str;

    /// How the backend folds unquoted identifiers in its catalog.
    fn case_folding(&self) -> CaseFolding;

    // ===== Type mapping =====

    /// Map a logical type plus optional length / (precision, scale) to the
    /// exact backend type token.
    fn type_token(
        &self,
        attr_type: TableAttributeType,
        length: Option<u32>,
        precision_scale: Option<(u32, u32)>,
    ) -> String;

    /// Backend type token for an attribute.
    fn column_type(&self, attr: &TableAttribute) -> String {
        self.type_token(attr.attr_type(), attr.declared_length(), attr.precision_scale())
    }

    // ===== Primary keys =====

    /// Decide inline vs. trailing primary-key syntax for a table.
    fn primary_key_layout(&self, table: &Table) -> PrimaryKeyLayout {
        PrimaryKeyLayout::trailing(table)
    }

    // ===== Foreign keys =====

    /// Inline constraint clause used inside CREATE TABLE.
    fn inline_foreign_key(&self, attr: &TableAttribute) -> Option<String> {
        attr.foreign_key().map(|fk| {
            format!(
                "FOREIGN KEY ({}) REFERENCES {}({})",
                attr.name(),
                fk.table,
                fk.attribute
            )
        })
    }

    /// Constraint name for a foreign key added to an existing table.
    fn foreign_key_name(&self, table: &str, attr: &TableAttribute) -> String {
        format!("{}_{}", table, attr.name())
    }

    /// Separate statement adding a foreign key to an existing table.
    fn add_foreign_key(&self, table: &str, attr: &TableAttribute) -> Option<String> {
        attr.foreign_key().map(|fk| {
            format!(
                "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({})",
                table,
                self.foreign_key_name(table, attr),
                attr.name(),
                fk.table,
                fk.attribute
            )
        })
    }

    // ===== Renames =====

    /// Column rename statement (no terminator).
    ///
    /// # Errors
    ///
    /// `UnsupportedDialectFeature` when the backend has no rename syntax the
    /// engine can express.
    fn rename_column(&self, table: &str, old_name: &str, new_name: &str) -> Result<String>;

    // ===== Introspection =====

    /// Get a parameter placeholder for the given 1-based index.
    fn param_placeholder(&self, index: usize) -> String;

    /// `COUNT(*)` query; parameter 1 is the folded table name.
    fn table_exists_query(&self) -> String;

    /// `COUNT(*)` query; parameters are the folded table and column names.
    fn column_exists_query(&self) -> String;

    /// `COUNT(*)` query; parameters are the folded table and constraint names.
    fn constraint_exists_query(&self) -> String;

    /// Row count of a table.
    fn row_count_query(&self, table: &str) -> String {
        format!("SELECT COUNT(*) FROM {}", table)
    }
}

/// A live database connection used by the migration executor.
///
/// Implementations hold exactly one connection from open until `close` (or
/// drop).
#[async_trait]
pub trait SchemaConnection: Send + Sync {
    /// Get the database type identifier (e.g., "postgres", "mysql").
    fn db_type(&self) -> &str;

    /// Execute one DDL statement. Returns the affected row count where the
    /// backend reports one.
    async fn execute(&self, sql: &str) -> Result<u64>;

    /// Run a query whose first column of the first row is a count.
    async fn query_count(&self, sql: &str, params: &[String]) -> Result<i64>;

    /// Check the connection is usable.
    async fn ping(&self) -> Result<()> {
        self.execute("SELECT 1").await.map(|_| ())
    }

    /// Release the underlying session. Database-backed implementations fail
    /// every later call with an `Execution` error; the default does nothing.
    async fn close(&self) {}
}
