//! HSQLDB SQL dialect (Strategy pattern).
//!
//! HSQL declares an integral single-column key inline as an identity column
//! and folds unquoted identifiers to upper case.

use crate::core::identifier::CaseFolding;
use crate::core::schema::{Table, TableAttributeType};
use crate::core::traits::{identity_candidate, Dialect, PrimaryKeyLayout};
use crate::drivers::common::catalog::count_query;
use crate::drivers::common::types::{char_token, decimal_token, varchar_token};
use crate::error::Result;

const SCHEMA_FILTER: &str = "TABLE_SCHEMA = CURRENT_SCHEMA";

/// Inline clause for an identity primary key.
const IDENTITY_CLAUSE: &str = "GENERATED BY DEFAULT AS IDENTITY(START WITH 1) NOT NULL PRIMARY KEY";

/// HSQLDB dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct HsqlDialect;

impl HsqlDialect {
    /// Create a new HSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for HsqlDialect {
    fn name(&self) -> &str {
        "hsql"
    }

    fn case_folding(&self) -> CaseFolding {
        CaseFolding::Upper
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
            TableAttributeType::Short => "SMALLINT".to_string(),
            TableAttributeType::Int => "INT".to_string(),
            TableAttributeType::Long => "BIGINT".to_string(),
            TableAttributeType::Decimal => decimal_token(precision_scale),
            TableAttributeType::Date => "DATE".to_string(),
            TableAttributeType::Timestamp => "TIMESTAMP".to_string(),
            TableAttributeType::Locale => varchar_token(None),
            TableAttributeType::Binary => "LONGVARBINARY".to_string(),
        }
    }

    fn primary_key_layout(&self, table: &Table) -> PrimaryKeyLayout {
        match identity_candidate(table) {
            Some(pk) => PrimaryKeyLayout {
                inline: Some((pk.name().to_string(), IDENTITY_CLAUSE.to_string())),
                trailing: Vec::new(),
            },
            None => PrimaryKeyLayout::trailing(table),
        }
    }

    fn rename_column(&self, table: &str, old_name: &str, new_name: &str) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ALTER COLUMN {} RENAME TO {}",
            table, old_name, new_name
        ))
    }

    fn param_placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn table_exists_query(&self) -> String {
        count_query(self, "INFORMATION_SCHEMA.TABLES", SCHEMA_FILTER, &["TABLE_NAME"])
    }

    fn column_exists_query(&self) -> String {
        count_query(
            self,
            "INFORMATION_SCHEMA.COLUMNS",
            SCHEMA_FILTER,
            &["TABLE_NAME", "COLUMN_NAME"],
        )
    }

    fn constraint_exists_query(&self) -> String {
        count_query(
            self,
            "INFORMATION_SCHEMA.TABLE_CONSTRAINTS",
            SCHEMA_FILTER,
            &["TABLE_NAME", "CONSTRAINT_NAME"],
        )
    }
}
