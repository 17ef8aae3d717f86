//! Migration plans: an ordered list of steps loaded from YAML.
//!
//! ```yaml
//! steps:
//!   - op: create_table
//!     table:
//!       name: t_address
//!       attributes:
//!         - { name: pk, type: int, primary_key: true }
//!         - { name: city, type: varchar, length: 100, nullable: false }
//!   - op: add_unique_constraint
//!     table: t_address
//!     name: t_address_city_key
//!     columns: [city]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builder::DdlScript;
use crate::core::traits::Dialect;
use crate::error::{MigrateError, Result};
use crate::executor::MigrationStep;

/// Ordered migration steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub steps: Vec<MigrationStep>,
}

impl MigrationPlan {
    /// Load a plan from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MigrateError::Config(format!("Cannot read plan {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a plan from a YAML string. Table definitions are validated here.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let plan: MigrationPlan = serde_yaml::from_str(yaml)?;
        debug!("Loaded migration plan with {} steps", plan.steps.len());
        Ok(plan)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// DDL for the whole plan against an empty schema, without a connection.
    pub fn render(&self, dialect: &dyn Dialect) -> Result<String> {
        let mut script = DdlScript::new();
        for step in &self.steps {
            script.append(step.script(dialect, &|_| false)?);
        }
        Ok(script.to_string())
    }
}
