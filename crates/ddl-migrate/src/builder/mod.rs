//! DDL statement builder.
//!
//! Pure functions from schema model plus dialect to DDL text. Nothing here
//! touches a connection; the same inputs always produce the same text.
//!
//! Each operation comes in two forms:
//! - `*_script` returns a [`DdlScript`], the statement list the executor runs
//! - `build_*` returns the rendered text, as written to logs and audit files
//!
//! Rendered statements end in `;\n`; audit lines are SQL comments.

use std::fmt;

use serde::Serialize;

use crate::core::identifier::validate_identifier;
use crate::core::schema::{Table, TableAttribute};
use crate::core::traits::Dialect;
use crate::error::{MigrateError, Result};

/// One line of generated DDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum DdlLine {
    /// Executable statement, without terminator.
    Statement(String),
    /// Audit comment, without the `-- ` prefix.
    Comment(String),
}

impl fmt::Display for DdlLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DdlLine::Statement(sql) => writeln!(f, "{};", sql),
            DdlLine::Comment(text) => writeln!(f, "-- {}", text),
        }
    }
}

/// Ordered list of generated statements and audit comments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DdlScript {
    lines: Vec<DdlLine>,
}

impl DdlScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script holding a single statement.
    pub fn statement(sql: impl Into<String>) -> Self {
        let mut script = Self::new();
        script.push_statement(sql);
        script
    }

    pub fn push_statement(&mut self, sql: impl Into<String>) {
        self.lines.push(DdlLine::Statement(sql.into()));
    }

    pub fn push_comment(&mut self, text: impl Into<String>) {
        self.lines.push(DdlLine::Comment(text.into()));
    }

    /// Append every line of another script.
    pub fn append(&mut self, other: DdlScript) {
        self.lines.extend(other.lines);
    }

    pub fn lines(&self) -> &[DdlLine] {
        &self.lines
    }

    /// Executable statements in program order.
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            DdlLine::Statement(sql) => Some(sql.as_str()),
            DdlLine::Comment(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the script contains anything to execute.
    pub fn has_statements(&self) -> bool {
        self.statements().next().is_some()
    }
}

impl fmt::Display for DdlScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Column definition used by both CREATE TABLE and ADD COLUMN.
fn column_definition(attr: &TableAttribute, dialect: &dyn Dialect) -> String {
    let mut def = format!("{} {}", attr.name(), dialect.column_type(attr));
    if !attr.is_nullable() {
        def.push_str(" NOT NULL");
    }
    def
}

/// CREATE TABLE for a table.
///
/// Columns come in declaration order, then the trailing primary-key clause
/// (if the dialect uses one), then one foreign-key clause per referencing
/// column.
pub fn create_table_script(table: &Table, dialect: &dyn Dialect) -> Result<DdlScript> {
    let layout = dialect.primary_key_layout(table);
    let mut defs = Vec::with_capacity(table.attributes().len() + 1);

    for attr in table.attributes() {
        let def = match layout.inline_clause(attr.name()) {
            Some(clause) => format!("{} {} {}", attr.name(), dialect.column_type(attr), clause),
            // The trailing PRIMARY KEY clause implies NOT NULL
            None if layout.covers(attr.name()) => {
                format!("{} {}", attr.name(), dialect.column_type(attr))
            }
            None => column_definition(attr, dialect),
        };
        defs.push(def);
    }

    if !layout.trailing.is_empty() {
        defs.push(format!("PRIMARY KEY ({})", layout.trailing.join(", ")));
    }

    defs.extend(
        table
            .attributes()
            .iter()
            .filter_map(|attr| dialect.inline_foreign_key(attr)),
    );

    Ok(DdlScript::statement(format!(
        "CREATE TABLE {} (\n  {}\n)",
        table.name(),
        defs.join(",\n  ")
    )))
}

pub fn build_create_table(table: &Table, dialect: &dyn Dialect) -> Result<String> {
    Ok(create_table_script(table, dialect)?.to_string())
}

/// ADD COLUMN statements for an existing table.
///
/// `exists` reports whether a column is already present in the live schema.
/// Present columns become a `Does already exist:` audit comment and their
/// foreign key is not emitted; every other column gets its ADD COLUMN
/// followed by its ADD CONSTRAINT ... FOREIGN KEY, if it carries one.
pub fn add_columns_script<F>(
    table_name: &str,
    attributes: &[TableAttribute],
    dialect: &dyn Dialect,
    exists: F,
) -> Result<DdlScript>
where
    F: Fn(&str) -> bool,
{
    let mut script = DdlScript::new();
    if attributes.is_empty() {
        return Ok(script);
    }

    validate_identifier(table_name)?;

    for attr in attributes {
        attr.validate()?;
        let statement = format!(
            "ALTER TABLE {} ADD COLUMN {}",
            table_name,
            column_definition(attr, dialect)
        );

        if exists(attr.name()) {
            script.push_comment(format!("Does already exist: {};", statement));
            continue;
        }

        script.push_statement(statement);
        if let Some(fk) = dialect.add_foreign_key(table_name, attr) {
            script.push_statement(fk);
        }
    }

    Ok(script)
}

pub fn build_add_columns<F>(
    table_name: &str,
    attributes: &[TableAttribute],
    dialect: &dyn Dialect,
    exists: F,
) -> Result<String>
where
    F: Fn(&str) -> bool,
{
    Ok(add_columns_script(table_name, attributes, dialect, exists)?.to_string())
}

/// ADD CONSTRAINT ... UNIQUE over the given columns.
pub fn add_unique_constraint_script<S: AsRef<str>>(
    table_name: &str,
    constraint_name: &str,
    columns: &[S],
) -> Result<DdlScript> {
    validate_identifier(table_name)?;
    validate_identifier(constraint_name)?;
    if columns.is_empty() {
        return Err(MigrateError::InvalidSchema(format!(
            "Unique constraint {} on {} has no columns",
            constraint_name, table_name
        )));
    }
    for column in columns {
        validate_identifier(column.as_ref())?;
    }

    let columns: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
    Ok(DdlScript::statement(format!(
        "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({})",
        table_name,
        constraint_name,
        columns.join(", ")
    )))
}

pub fn build_add_unique_constraint<S: AsRef<str>>(
    table_name: &str,
    constraint_name: &str,
    columns: &[S],
    _dialect: &dyn Dialect,
) -> Result<String> {
    Ok(add_unique_constraint_script(table_name, constraint_name, columns)?.to_string())
}

/// Column rename, rendered entirely by the dialect's template.
///
/// # Errors
///
/// `UnsupportedDialectFeature` when the dialect has no rename syntax.
pub fn rename_column_script(
    table_name: &str,
    old_name: &str,
    new_name: &str,
    dialect: &dyn Dialect,
) -> Result<DdlScript> {
    validate_identifier(table_name)?;
    validate_identifier(old_name)?;
    validate_identifier(new_name)?;
    Ok(DdlScript::statement(
        dialect.rename_column(table_name, old_name, new_name)?,
    ))
}

pub fn build_rename_column(
    table_name: &str,
    old_name: &str,
    new_name: &str,
    dialect: &dyn Dialect,
) -> Result<String> {
    Ok(rename_column_script(table_name, old_name, new_name, dialect)?.to_string())
}

pub fn drop_table_script(table_name: &str) -> Result<DdlScript> {
    validate_identifier(table_name)?;
    Ok(DdlScript::statement(format!("DROP TABLE {}", table_name)))
}

pub fn build_drop_table(table_name: &str) -> Result<String> {
    Ok(drop_table_script(table_name)?.to_string())
}

pub fn drop_column_script(table_name: &str, column_name: &str) -> Result<DdlScript> {
    validate_identifier(table_name)?;
    validate_identifier(column_name)?;
    Ok(DdlScript::statement(format!(
        "ALTER TABLE {} DROP COLUMN {}",
        table_name, column_name
    )))
}

pub fn build_drop_column(table_name: &str, column_name: &str) -> Result<String> {
    Ok(drop_column_script(table_name, column_name)?.to_string())
}
