//! MySQL/MariaDB SQL dialect (Strategy pattern).
//!
//! An integral single-column key becomes an `AUTO_INCREMENT` column with the
//! key itself declared in the trailing clause. Column renames are not
//! expressible: `CHANGE` needs the full column definition, which a rename
//! does not carry.

use crate::core::identifier::CaseFolding;
use crate::core::schema::{Table, TableAttributeType};
use crate::core::traits::{identity_candidate, Dialect, PrimaryKeyLayout};
use crate::drivers::common::catalog::count_query;
use crate::drivers::common::types::{char_token, decimal_token, varchar_token};
use crate::error::{MigrateError, Result};

const SCHEMA_FILTER: &str = "TABLE_SCHEMA = DATABASE()";

/// MySQL/MariaDB dialect implementation.
///
/// Compatible with MySQL 5.7+, 8.0+, and MariaDB 10.2+.
#[derive(Debug, Clone, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Create a new MySQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &str {
        "mysql"
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
            TableAttributeType::Short => "SMALLINT".to_string(),
            TableAttributeType::Int => "INT".to_string(),
            TableAttributeType::Long => "BIGINT".to_string(),
            TableAttributeType::Decimal => decimal_token(precision_scale),
            TableAttributeType::Date => "DATE".to_string(),
            // MySQL TIMESTAMP auto-updates on row change; DATETIME does not
            TableAttributeType::Timestamp => "DATETIME".to_string(),
            TableAttributeType::Locale => varchar_token(None),
            TableAttributeType::Binary => "LONGBLOB".to_string(),
        }
    }

    fn primary_key_layout(&self, table: &Table) -> PrimaryKeyLayout {
        let mut layout = PrimaryKeyLayout::trailing(table);
        if let Some(pk) = identity_candidate(table) {
            layout.inline = Some((pk.name().to_string(), "NOT NULL AUTO_INCREMENT".to_string()));
        }
        layout
    }

    fn rename_column(&self, _table: &str, _old_name: &str, _new_name: &str) -> Result<String> {
        Err(MigrateError::unsupported(
            self.name(),
            "column rename (CHANGE requires the full column definition)",
        ))
    }

    fn param_placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn table_exists_query(&self) -> String {
        count_query(self, "information_schema.TABLES", SCHEMA_FILTER, &["TABLE_NAME"])
    }

    fn column_exists_query(&self) -> String {
        count_query(
            self,
            "information_schema.COLUMNS",
            SCHEMA_FILTER,
            &["TABLE_NAME", "COLUMN_NAME"],
        )
    }

    fn constraint_exists_query(&self) -> String {
        count_query(
            self,
            "information_schema.TABLE_CONSTRAINTS",
            SCHEMA_FILTER,
            &["TABLE_NAME", "CONSTRAINT_NAME"],
        )
    }
}
