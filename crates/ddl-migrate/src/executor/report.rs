//! Per-step and per-run results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};

/// Lifecycle of one step.
///
/// `Planned -> Checked -> Applied -> Verified`, or `Planned -> Checked` then
/// `Skipped` or `Failed`. `Applied` is terminal when verification is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Planned,
    Checked,
    Applied,
    Verified,
    Skipped,
    Failed,
}

/// Why a step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Live schema made the step unsafe; only this step is aborted.
    SchemaConflict,
    /// The database rejected a statement; the run halts.
    Execution,
    /// A statement ran but the catalog does not show its effect; the run halts.
    Verification,
}

impl FailureKind {
    pub fn of(error: &MigrateError) -> Self {
        match error {
            MigrateError::SchemaConflict { .. } => FailureKind::SchemaConflict,
            MigrateError::Verification { .. } => FailureKind::Verification,
            _ => FailureKind::Execution,
        }
    }

    /// Whether the run stops after a failure of this kind.
    pub fn halts_run(&self) -> bool {
        !matches!(self, FailureKind::SchemaConflict)
    }
}

/// What a step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepOutcome {
    Applied,
    Skipped,
    Failed { kind: FailureKind, reason: String },
}

impl StepOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }
}

/// Result of one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    /// Position in the plan (0-based).
    pub index: usize,
    pub description: String,
    /// Generated DDL, statements and audit comments.
    pub ddl: String,
    pub state: StepState,
    pub outcome: StepOutcome,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Unique run identifier.
    pub run_id: String,

    /// Dialect the run used.
    pub dialect: String,

    /// Hash of the configuration the run used, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,

    /// Number of steps in the plan.
    pub steps_total: usize,

    /// Outcomes of the attempted steps, in plan order.
    pub steps: Vec<StepReport>,

    /// Index of the step that stopped the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted_at: Option<usize>,
}

impl MigrationReport {
    /// No step failed and every step was attempted.
    pub fn is_success(&self) -> bool {
        self.halted_at.is_none() && !self.steps.iter().any(|s| s.outcome.is_failed())
    }

    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, StepOutcome::Applied))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, StepOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(StepOutcome::is_failed)
    }

    fn count(&self, pred: impl Fn(&StepOutcome) -> bool) -> usize {
        self.steps.iter().filter(|s| pred(&s.outcome)).count()
    }

    /// Full DDL of the run, one block per step.
    pub fn ddl(&self) -> String {
        self.steps.iter().map(|s| s.ddl.as_str()).collect()
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(index: usize, outcome: StepOutcome) -> StepReport {
        StepReport {
            index,
            description: format!("step {}", index),
            ddl: String::new(),
            state: StepState::Verified,
            outcome,
        }
    }

    #[test]
    fn test_counts_and_success() {
        let now = Utc::now();
        let mut report = MigrationReport {
            run_id: "run".into(),
            dialect: "postgres".into(),
            config_hash: None,
            started_at: now,
            completed_at: now,
            steps_total: 3,
            steps: vec![
                step(0, StepOutcome::Applied),
                step(1, StepOutcome::Skipped),
                step(
                    2,
                    StepOutcome::Failed {
                        kind: FailureKind::SchemaConflict,
                        reason: "not empty".into(),
                    },
                ),
            ],
            halted_at: None,
        };
        assert_eq!(report.applied(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());

        report.steps.pop();
        assert!(report.is_success());

        let json = report.to_json().unwrap();
        assert!(json.contains("\"result\": \"skipped\""));
        assert!(!json.contains("halted_at"));
    }

    #[test]
    fn test_failure_kind_halting() {
        assert!(!FailureKind::of(&MigrateError::conflict("t", "x")).halts_run());
        assert!(FailureKind::of(&MigrateError::execution("DROP TABLE t", "x")).halts_run());
        assert!(FailureKind::of(&MigrateError::verification("t", "x")).halts_run());
    }
}
