//! Migration steps: the engine's unit of work.

use serde::{Deserialize, Serialize};

use crate::builder::{
    add_columns_script, add_unique_constraint_script, create_table_script, drop_column_script,
    drop_table_script, rename_column_script, DdlScript,
};
use crate::core::schema::{Table, TableAttribute};
use crate::core::traits::Dialect;
use crate::error::Result;

/// One schema change, tagged by `op` when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MigrationStep {
    CreateTable {
        table: Table,
    },
    DropTable {
        table: String,
    },
    AddColumns {
        table: String,
        attributes: Vec<TableAttribute>,
    },
    AddUniqueConstraint {
        table: String,
        name: String,
        columns: Vec<String>,
    },
    RenameColumn {
        table: String,
        from: String,
        to: String,
    },
    DropColumn {
        table: String,
        column: String,
    },
}

impl MigrationStep {
    /// Name of the table the step touches.
    pub fn table_name(&self) -> &str {
        match self {
            MigrationStep::CreateTable { table } => table.name(),
            MigrationStep::DropTable { table }
            | MigrationStep::AddColumns { table, .. }
            | MigrationStep::AddUniqueConstraint { table, .. }
            | MigrationStep::RenameColumn { table, .. }
            | MigrationStep::DropColumn { table, .. } => table,
        }
    }

    /// Short human-readable description for logs and reports.
    pub fn description(&self) -> String {
        match self {
            MigrationStep::CreateTable { table } => format!("create table {}", table.name()),
            MigrationStep::DropTable { table } => format!("drop table {}", table),
            MigrationStep::AddColumns { table, attributes } => {
                let names: Vec<&str> = attributes.iter().map(|a| a.name()).collect();
                format!("add columns {} to {}", names.join(", "), table)
            }
            MigrationStep::AddUniqueConstraint { table, name, .. } => {
                format!("add unique constraint {} to {}", name, table)
            }
            MigrationStep::RenameColumn { table, from, to } => {
                format!("rename column {}.{} to {}", table, from, to)
            }
            MigrationStep::DropColumn { table, column } => {
                format!("drop column {}.{}", table, column)
            }
        }
    }

    /// DDL for the step. `exists` answers which requested columns are
    /// already present; it only matters for `AddColumns`.
    pub fn script(&self, dialect: &dyn Dialect, exists: &dyn Fn(&str) -> bool) -> Result<DdlScript> {
        match self {
            MigrationStep::CreateTable { table } => create_table_script(table, dialect),
            MigrationStep::DropTable { table } => drop_table_script(table),
            MigrationStep::AddColumns { table, attributes } => {
                add_columns_script(table, attributes, dialect, exists)
            }
            MigrationStep::AddUniqueConstraint {
                table,
                name,
                columns,
            } => add_unique_constraint_script(table, name, columns.as_slice()),
            MigrationStep::RenameColumn { table, from, to } => {
                rename_column_script(table, from, to, dialect)
            }
            MigrationStep::DropColumn { table, column } => drop_column_script(table, column),
        }
    }
}
