//! PostgreSQL SQL dialect (Strategy pattern).
//!
//! PostgreSQL uses its own integer type names (`INT2`/`INT4`/`INT8`), always
//! declares the primary key in a trailing clause and folds unquoted
//! identifiers to lower case.

use crate::core::identifier::CaseFolding;
use crate::core::schema::TableAttributeType;
use crate::core::traits::Dialect;
use crate::drivers::common::catalog::count_query;
use crate::drivers::common::types::{char_token, decimal_token, varchar_token};
use crate::error::Result;

const SCHEMA_FILTER: &str = "table_schema = current_schema()";

/// PostgreSQL dialect implementation.
///
/// Implements the Strategy pattern for SQL syntax differences.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Create a new PostgreSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn case_folding(&self) -> CaseFolding {
        CaseFolding::Lower
    }

    fn type_token(
        &self,
        attr_type: TableAttributeType,
        length: Option<u32>,
        precision_scale: Option<(u32, u32)>,
    ) -> String {
        match attr_type {
            TableAttributeType::Char => char_token(length),
            TableAttributeType::Varchar => varchar_token(length),
            TableAttributeType::Boolean => "BOOLEAN".to_string(),
            TableAttributeType::Short => "INT2".to_string(),
            TableAttributeType::Int => "INT4".to_string(),
            TableAttributeType::Long => "INT8".to_string(),
            TableAttributeType::Decimal => decimal_token(precision_scale),
            TableAttributeType::Date => "DATE".to_string(),
            TableAttributeType::Timestamp => "TIMESTAMP".to_string(),
            TableAttributeType::Locale => varchar_token(None),
            TableAttributeType::Binary => "BYTEA".to_string(),
        }
    }

    fn rename_column(&self, table: &str, old_name: &str, new_name: &str) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            table, old_name, new_name
        ))
    }

    fn param_placeholder(&self, index: usize) -> String {
        // PostgreSQL uses $1, $2, etc. (1-based)
        format!("${}", index)
    }

    fn table_exists_query(&self) -> String {
        count_query(self, "information_schema.tables", SCHEMA_FILTER, &["table_name"])
    }

    fn column_exists_query(&self) -> String {
        count_query(
            self,
            "information_schema.columns",
            SCHEMA_FILTER,
            &["table_name", "column_name"],
        )
    }

    fn constraint_exists_query(&self) -> String {
        count_query(
            self,
            "information_schema.table_constraints",
            SCHEMA_FILTER,
            &["table_name", "constraint_name"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{Table, TableAttribute};

    #[test]
    fn test_type_tokens() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.type_token(TableAttributeType::Int, None, None), "INT4");
        assert_eq!(dialect.type_token(TableAttributeType::Short, None, None), "INT2");
        assert_eq!(dialect.type_token(TableAttributeType::Long, None, None), "INT8");
        assert_eq!(
            dialect.type_token(TableAttributeType::Decimal, None, Some((8, 2))),
            "DECIMAL(8, 2)"
        );
        assert_eq!(
            dialect.type_token(TableAttributeType::Varchar, Some(100), None),
            "VARCHAR(100)"
        );
        assert_eq!(dialect.type_token(TableAttributeType::Binary, None, None), "BYTEA");
        assert_eq!(dialect.type_token(TableAttributeType::Timestamp, None, None), "TIMESTAMP");
    }

    #[test]
    fn test_integral_key_is_trailing() {
        let table = Table::builder("t_test")
            .attribute(TableAttribute::new("pk", TableAttributeType::Int).primary_key())
            .build()
            .unwrap();
        let layout = PostgresDialect::new().primary_key_layout(&table);
        assert_eq!(layout.inline, None);
        assert_eq!(layout.trailing, vec!["pk".to_string()]);
    }

    #[test]
    fn test_rename_column() {
        assert_eq!(
            PostgresDialect::new()
                .rename_column("t_test", "old_col", "new_col")
                .unwrap(),
            "ALTER TABLE t_test RENAME COLUMN old_col TO new_col"
        );
    }

    #[test]
    fn test_param_placeholder() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.param_placeholder(1), "$1");
        assert_eq!(dialect.param_placeholder(10), "$10");
    }

    #[test]
    fn test_introspection_queries_use_placeholders() {
        let dialect = PostgresDialect::new();
        assert!(dialect.table_exists_query().ends_with("LOWER(table_name) = $1"));
        assert!(dialect.column_exists_query().contains("LOWER(column_name) = $2"));
        assert!(dialect.constraint_exists_query().contains("table_constraints"));
        assert_eq!(dialect.row_count_query("t_test"), "SELECT COUNT(*) FROM t_test");
    }
}
