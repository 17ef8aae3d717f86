//! In-memory [`SchemaConnection`] for tests.
//!
//! Interprets the DDL this crate generates against a tiny catalog and answers
//! the dialects' `INFORMATION_SCHEMA` count queries. Names are compared case
//! insensitively. Clones share state, so a test can hand one clone to the
//! executor and inspect the other afterwards. Closing only counts; the
//! catalog survives for the next run.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::traits::SchemaConnection;
use crate::error::{MigrateError, Result};

#[derive(Debug, Default)]
struct FakeTable {
    columns: Vec<String>,
    constraints: Vec<String>,
    rows: i64,
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeMap<String, FakeTable>,
    executed: Vec<String>,
    queries: Vec<(String, Vec<String>)>,
    fail_on: Vec<String>,
    no_effect_on: Vec<String>,
    closes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FakeConnection {
    state: Arc<Mutex<State>>,
}

fn key(name: &str) -> String {
    name.to_ascii_uppercase()
}

fn rejected(sql: &str, message: impl Into<String>) -> MigrateError {
    MigrateError::execution(sql, message.into())
}

impl FakeConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every statement containing `fragment` fail.
    pub fn fail_on(&self, fragment: &str) {
        self.lock().fail_on.push(fragment.to_string());
    }

    /// Accept statements containing `fragment` without changing the catalog.
    pub fn no_effect_on(&self, fragment: &str) {
        self.lock().no_effect_on.push(fragment.to_string());
    }

    /// Seed a table without recording a statement.
    pub fn create_table(&self, table: &str, columns: &[&str]) {
        self.lock().tables.insert(
            key(table),
            FakeTable {
                columns: columns.iter().map(|c| key(c)).collect(),
                ..FakeTable::default()
            },
        );
    }

    /// Seed a named constraint without recording a statement.
    pub fn add_constraint(&self, table: &str, constraint: &str) {
        if let Some(t) = self.lock().tables.get_mut(&key(table)) {
            t.constraints.push(key(constraint));
        }
    }

    pub fn insert_rows(&self, table: &str, rows: i64) {
        if let Some(t) = self.lock().tables.get_mut(&key(table)) {
            t.rows += rows;
        }
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.lock().tables.contains_key(&key(table))
    }

    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.lock()
            .tables
            .get(&key(table))
            .map(|t| t.columns.contains(&key(column)))
            .unwrap_or(false)
    }

    pub fn rows(&self, table: &str) -> Option<i64> {
        self.lock().tables.get(&key(table)).map(|t| t.rows)
    }

    /// Statements passed to `execute`, in order.
    pub fn executed(&self) -> Vec<String> {
        self.lock().executed.clone()
    }

    /// Queries passed to `query_count` with their parameters.
    pub fn queries(&self) -> Vec<(String, Vec<String>)> {
        self.lock().queries.clone()
    }

    /// How many times `close` was called.
    pub fn close_count(&self) -> usize {
        self.lock().closes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn apply(state: &mut State, sql: &str) -> Result<()> {
        let tokens: Vec<String> = sql
            .split(|c: char| c.is_whitespace() || c == '(')
            .filter(|t| !t.is_empty())
            .map(key)
            .collect();
        let words: Vec<&str> = tokens.iter().map(String::as_str).collect();

        match words.as_slice() {
            ["SELECT", "1", ..] => Ok(()),
            ["CREATE", "TABLE", name, ..] => {
                if state.tables.contains_key(*name) {
                    return Err(rejected(sql, format!("table {} already exists", name)));
                }
                let body = sql
                    .find('(')
                    .zip(sql.rfind(')'))
                    .map(|(start, end)| &sql[start + 1..end])
                    .unwrap_or("");
                let columns = body
                    .lines()
                    .map(|line| line.trim().trim_end_matches(','))
                    .filter(|line| !line.is_empty())
                    .filter(|line| {
                        let upper = key(line);
                        !upper.starts_with("PRIMARY KEY") && !upper.starts_with("FOREIGN KEY")
                    })
                    .filter_map(|line| line.split_whitespace().next().map(key))
                    .collect();
                state.tables.insert(
                    name.to_string(),
                    FakeTable {
                        columns,
                        ..FakeTable::default()
                    },
                );
                Ok(())
            }
            ["DROP", "TABLE", name] => match state.tables.remove(*name) {
                Some(_) => Ok(()),
                None => Err(rejected(sql, format!("table {} does not exist", name))),
            },
            ["ALTER", "TABLE", name, rest @ ..] => {
                let table = state
                    .tables
                    .get_mut(*name)
                    .ok_or_else(|| rejected(sql, format!("table {} does not exist", name)))?;
                match rest {
                    ["ADD", "COLUMN", column, ..] => {
                        if table.columns.iter().any(|c| c == column) {
                            return Err(rejected(sql, format!("column {} already exists", column)));
                        }
                        table.columns.push(column.to_string());
                    }
                    ["ADD", "CONSTRAINT", constraint, ..] => {
                        if table.constraints.iter().any(|c| c == constraint) {
                            return Err(rejected(
                                sql,
                                format!("constraint {} already exists", constraint),
                            ));
                        }
                        table.constraints.push(constraint.to_string());
                    }
                    ["DROP", "COLUMN", column] => {
                        let before = table.columns.len();
                        table.columns.retain(|c| c != column);
                        if table.columns.len() == before {
                            return Err(rejected(sql, format!("column {} does not exist", column)));
                        }
                    }
                    ["RENAME", "COLUMN", old, "TO", new]
                    | ["ALTER", "COLUMN", old, "RENAME", "TO", new] => {
                        let slot = table
                            .columns
                            .iter_mut()
                            .find(|c| c.as_str() == *old)
                            .ok_or_else(|| rejected(sql, format!("column {} does not exist", old)))?;
                        *slot = new.to_string();
                    }
                    _ => return Err(rejected(sql, "unsupported ALTER TABLE")),
                }
                Ok(())
            }
            _ => Err(rejected(sql, "unsupported statement")),
        }
    }
}

#[async_trait]
impl SchemaConnection for FakeConnection {
    fn db_type(&self) -> &str {
        "fake"
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        let mut state = self.lock();
        state.executed.push(sql.to_string());

        if state.fail_on.iter().any(|f| sql.contains(f.as_str())) {
            return Err(rejected(sql, "injected failure"));
        }
        if state.no_effect_on.iter().any(|f| sql.contains(f.as_str())) {
            return Ok(0);
        }
        Self::apply(&mut state, sql)?;
        Ok(0)
    }

    async fn query_count(&self, sql: &str, params: &[String]) -> Result<i64> {
        let mut state = self.lock();
        state.queries.push((sql.to_string(), params.to_vec()));

        let upper = key(sql);
        let param = |i: usize| params.get(i).map(|p| key(p)).unwrap_or_default();

        if upper.contains("INFORMATION_SCHEMA") {
            let table = state.tables.get(&param(0));
            let found = if upper.contains("TABLE_CONSTRAINTS") {
                table.map(|t| t.constraints.contains(&param(1))).unwrap_or(false)
            } else if upper.contains("COLUMNS") {
                table.map(|t| t.columns.contains(&param(1))).unwrap_or(false)
            } else {
                table.is_some()
            };
            return Ok(i64::from(found));
        }

        // SELECT COUNT(*) FROM <table>
        let name = upper.split_whitespace().nth(3).unwrap_or_default().to_string();
        state
            .tables
            .get(&name)
            .map(|t| t.rows)
            .ok_or_else(|| rejected(sql, format!("table {} does not exist", name)))
    }

    async fn close(&self) {
        self.lock().closes += 1;
    }
}
