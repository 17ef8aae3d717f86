//! Migration executor: the only component that changes a live schema.
//!
//! A run takes an ordered list of [`MigrationStep`]s and one connection:
//!
//! 1. Every step's DDL is built up front. Any build error (unsupported
//!    dialect feature, invalid schema) aborts the run before a single
//!    statement is sent.
//! 2. Steps then run strictly in order. Each one is checked against the
//!    catalog, executed unless already applied, and verified.
//! 3. A schema conflict fails only its step. An execution or verification
//!    failure halts the run; later steps are not attempted.
//!
//! The connection is closed when the run ends, whatever the outcome.

mod report;
mod step;

pub use report::{FailureKind, MigrationReport, StepOutcome, StepReport, StepState};
pub use step::MigrationStep;

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::builder::DdlScript;
use crate::config::{Config, ConstraintPolicy, MigrationOptions};
use crate::core::traits::{Dialect, SchemaConnection};
use crate::drivers::DialectImpl;
use crate::error::{MigrateError, Result};
use crate::introspect::SchemaIntrospector;

/// Runs migration steps against one connection.
pub struct MigrationExecutor {
    dialect: DialectImpl,
    options: MigrationOptions,
    config_hash: Option<String>,
}

impl MigrationExecutor {
    /// Create an executor with default options.
    pub fn new(dialect: DialectImpl) -> Self {
        Self {
            dialect,
            options: MigrationOptions::default(),
            config_hash: None,
        }
    }

    /// Create an executor from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.dialect()?)
            .with_options(config.migration.clone())
            .with_config_hash(config.hash()))
    }

    pub fn with_options(mut self, options: MigrationOptions) -> Self {
        self.options = options;
        self
    }

    /// Tag run reports with a configuration hash.
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn dialect(&self) -> &DialectImpl {
        &self.dialect
    }

    /// Build the DDL of every step as if run on an empty schema.
    pub fn prepare(&self, steps: &[MigrationStep]) -> Result<Vec<DdlScript>> {
        steps
            .iter()
            .map(|step| step.script(&self.dialect, &|_| false))
            .collect()
    }

    /// Run the steps in order, then close the connection.
    ///
    /// # Errors
    ///
    /// Only build errors are returned as `Err`; nothing has been executed
    /// when that happens. Failures while running are recorded in the report.
    pub async fn run<C: SchemaConnection>(
        &self,
        conn: C,
        steps: &[MigrationStep],
    ) -> Result<MigrationReport> {
        let result = self.run_on(&conn, steps).await;
        conn.close().await;
        result
    }

    async fn run_on<C: SchemaConnection + ?Sized>(
        &self,
        conn: &C,
        steps: &[MigrationStep],
    ) -> Result<MigrationReport> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        let prepared = self.prepare(steps).map_err(|e| {
            error!("Migration aborted before execution: {}", e);
            e
        })?;

        info!(
            "Starting migration run {}: {} steps ({})",
            run_id,
            steps.len(),
            self.dialect.name()
        );

        let introspector = SchemaIntrospector::new(conn, &self.dialect);
        let mut reports = Vec::with_capacity(steps.len());
        let mut halted_at = None;

        for (index, (step, script)) in steps.iter().zip(prepared).enumerate() {
            let report = self.run_step(conn, &introspector, index, step, script).await;
            let halts = matches!(
                &report.outcome,
                StepOutcome::Failed { kind, .. } if kind.halts_run()
            );
            reports.push(report);
            if halts {
                error!(
                    "Migration halted at step {}; {} step(s) not attempted",
                    index,
                    steps.len() - index - 1
                );
                halted_at = Some(index);
                break;
            }
        }

        let report = MigrationReport {
            run_id,
            dialect: self.dialect.name().to_string(),
            config_hash: self.config_hash.clone(),
            started_at,
            completed_at: Utc::now(),
            steps_total: steps.len(),
            steps: reports,
            halted_at,
        };

        info!(
            "Migration run {} finished: {} applied, {} skipped, {} failed",
            report.run_id,
            report.applied(),
            report.skipped(),
            report.failed()
        );

        Ok(report)
    }

    async fn run_step<C: SchemaConnection + ?Sized>(
        &self,
        conn: &C,
        introspector: &SchemaIntrospector<'_, C>,
        index: usize,
        step: &MigrationStep,
        script: DdlScript,
    ) -> StepReport {
        let description = step.description();
        debug!("Step {} ({}): planned", index, description);

        let mut state = StepState::Planned;
        let mut ddl = script;

        let outcome = match self
            .apply(conn, introspector, step, &mut state, &mut ddl)
            .await
        {
            Ok(outcome) => {
                info!("Step {} ({}): {:?}", index, description, state);
                outcome
            }
            Err(e) => {
                let kind = FailureKind::of(&e);
                error!("Step {} ({}) failed: {}", index, description, e);
                state = StepState::Failed;
                StepOutcome::Failed {
                    kind,
                    reason: e.to_string(),
                }
            }
        };

        StepReport {
            index,
            description,
            ddl: ddl.to_string(),
            state,
            outcome,
        }
    }

    /// Check, execute and verify one step.
    async fn apply<C: SchemaConnection + ?Sized>(
        &self,
        conn: &C,
        introspector: &SchemaIntrospector<'_, C>,
        step: &MigrationStep,
        state: &mut StepState,
        ddl: &mut DdlScript,
    ) -> Result<StepOutcome> {
        let table = step.table_name();

        match step {
            MigrationStep::CreateTable { .. } => {
                let exists = introspector.table_exists(table).await?;
                *state = StepState::Checked;
                if exists {
                    return Ok(skip(state, ddl, format!("table {} already exists", table)));
                }

                execute(conn, ddl, state).await?;
                if self.options.verify {
                    if !introspector.table_exists(table).await? {
                        return Err(MigrateError::verification(
                            table,
                            "table not found after CREATE TABLE",
                        ));
                    }
                    *state = StepState::Verified;
                }
            }

            MigrationStep::DropTable { .. } => {
                if !introspector.table_exists(table).await? {
                    *state = StepState::Checked;
                    return Ok(skip(state, ddl, format!("table {} does not exist", table)));
                }
                let rows = introspector.row_count(table).await?;
                *state = StepState::Checked;
                if rows > 0 {
                    return Err(MigrateError::conflict(
                        table,
                        format!("table holds {} row(s); refusing to drop it", rows),
                    ));
                }

                execute(conn, ddl, state).await?;
                if self.options.verify {
                    if introspector.table_exists(table).await? {
                        return Err(MigrateError::verification(
                            table,
                            "table still present after DROP TABLE",
                        ));
                    }
                    *state = StepState::Verified;
                }
            }

            MigrationStep::AddColumns { attributes, .. } => {
                if attributes.is_empty() {
                    *state = StepState::Checked;
                    return Ok(skip(state, ddl, format!("no columns requested for {}", table)));
                }
                if !introspector.table_exists(table).await? {
                    return Err(MigrateError::conflict(table, "table does not exist"));
                }
                let mut existing = HashSet::new();
                for attr in attributes {
                    if introspector.column_exists(table, attr.name()).await? {
                        warn!(
                            "Column {}.{} already exists; recorded as audit comment",
                            table,
                            attr.name()
                        );
                        existing.insert(attr.name().to_string());
                    }
                }
                *state = StepState::Checked;

                *ddl = step.script(&self.dialect, &|c: &str| existing.contains(c))?;
                if !ddl.has_statements() {
                    *state = StepState::Skipped;
                    return Ok(StepOutcome::Skipped);
                }

                execute(conn, ddl, state).await?;
                if self.options.verify {
                    for attr in attributes.iter().filter(|a| !existing.contains(a.name())) {
                        if !introspector.column_exists(table, attr.name()).await? {
                            return Err(MigrateError::verification(
                                table,
                                format!("column {} not found after ADD COLUMN", attr.name()),
                            ));
                        }
                        if attr.foreign_key().is_some() {
                            let fk = self.dialect.foreign_key_name(table, attr);
                            if !introspector.constraint_exists(table, &fk).await? {
                                return Err(MigrateError::verification(
                                    table,
                                    format!("foreign key {} not found after ADD CONSTRAINT", fk),
                                ));
                            }
                        }
                    }
                    *state = StepState::Verified;
                }
            }

            MigrationStep::AddUniqueConstraint { name, .. } => {
                let exists = match self.options.constraint_policy {
                    ConstraintPolicy::Attempt => false,
                    ConstraintPolicy::SkipExisting => {
                        introspector.constraint_exists(table, name).await?
                    }
                };
                *state = StepState::Checked;
                if exists {
                    return Ok(skip(
                        state,
                        ddl,
                        format!("constraint {} already exists on {}", name, table),
                    ));
                }

                execute(conn, ddl, state).await?;
                if self.options.verify {
                    if !introspector.constraint_exists(table, name).await? {
                        return Err(MigrateError::verification(
                            table,
                            format!("constraint {} not found after ADD CONSTRAINT", name),
                        ));
                    }
                    *state = StepState::Verified;
                }
            }

            MigrationStep::RenameColumn { from, to, .. } => {
                let old = introspector.column_exists(table, from).await?;
                let new = introspector.column_exists(table, to).await?;
                *state = StepState::Checked;
                match (old, new) {
                    (true, false) => {}
                    (false, true) => {
                        return Ok(skip(
                            state,
                            ddl,
                            format!("column {}.{} already renamed to {}", table, from, to),
                        ));
                    }
                    (true, true) => {
                        return Err(MigrateError::conflict(
                            table,
                            format!("both {} and {} exist; cannot rename", from, to),
                        ));
                    }
                    (false, false) => {
                        return Err(MigrateError::conflict(
                            table,
                            format!("neither {} nor {} exists; cannot rename", from, to),
                        ));
                    }
                }

                execute(conn, ddl, state).await?;
                if self.options.verify {
                    let renamed = introspector.column_exists(table, to).await?
                        && !introspector.column_exists(table, from).await?;
                    if !renamed {
                        return Err(MigrateError::verification(
                            table,
                            format!("column {} not renamed to {}", from, to),
                        ));
                    }
                    *state = StepState::Verified;
                }
            }

            MigrationStep::DropColumn { column, .. } => {
                let exists = introspector.column_exists(table, column).await?;
                *state = StepState::Checked;
                if !exists {
                    return Ok(skip(
                        state,
                        ddl,
                        format!("column {}.{} does not exist", table, column),
                    ));
                }

                execute(conn, ddl, state).await?;
                if self.options.verify {
                    if introspector.column_exists(table, column).await? {
                        return Err(MigrateError::verification(
                            table,
                            format!("column {} still present after DROP COLUMN", column),
                        ));
                    }
                    *state = StepState::Verified;
                }
            }
        }

        Ok(StepOutcome::Applied)
    }
}

/// Record a step as already applied; its DDL becomes a comment.
fn skip(state: &mut StepState, ddl: &mut DdlScript, reason: String) -> StepOutcome {
    debug!("Skipping: {}", reason);
    *state = StepState::Skipped;
    *ddl = DdlScript::new();
    ddl.push_comment(format!("Skipped: {}", reason));
    StepOutcome::Skipped
}

/// Execute a script's statements in program order.
async fn execute<C: SchemaConnection + ?Sized>(
    conn: &C,
    ddl: &DdlScript,
    state: &mut StepState,
) -> Result<()> {
    for sql in ddl.statements() {
        conn.execute(sql).await?;
    }
    *state = StepState::Applied;
    Ok(())
}
