//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database the migration runs against.
    pub database: DatabaseConfig,

    /// Migration behavior configuration.
    #[serde(default)]
    pub migration: MigrationOptions,
}

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Dialect identifier (hsql, postgres, mysql and their aliases).
    pub r#type: String,

    /// Database host.
    #[serde(default = "default_localhost")]
    pub host: String,

    /// Database port. Defaults per dialect when not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password. Never written back out.
    #[serde(default, skip_serializing)]
    pub password: String,

    /// TLS mode (default: disable).
    #[serde(default)]
    pub ssl_mode: SslMode,
}

impl DatabaseConfig {
    /// Configured port, or the dialect's standard port.
    pub fn port_or_default(&self) -> u16 {
        if let Some(port) = self.port {
            return port;
        }
        match self.r#type.to_lowercase().as_str() {
            "mysql" | "mariadb" => 3306,
            "hsql" | "hsqldb" => 9001,
            _ => 5432,
        }
    }
}

/// TLS verification modes, named after PostgreSQL's `sslmode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    /// Plain TCP connection.
    #[default]
    Disable,
    /// TLS without server certificate verification.
    Require,
    /// Verify the server certificate against the CA roots.
    VerifyCa,
    /// Verify certificate and hostname.
    VerifyFull,
}

impl SslMode {
    /// Check if this mode requires TLS.
    pub fn requires_tls(&self) -> bool {
        !matches!(self, SslMode::Disable)
    }
}

/// How ADD CONSTRAINT steps treat a constraint that may already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintPolicy {
    /// Always execute; a duplicate constraint surfaces as a failed step with
    /// the database error attached.
    #[default]
    Attempt,
    /// Look the constraint up first and skip the step when it exists.
    SkipExisting,
}

/// Migration behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Treatment of constraints that may already exist.
    #[serde(default)]
    pub constraint_policy: ConstraintPolicy,

    /// Re-run the catalog check after executing a step (default: true).
    #[serde(default = "default_true")]
    pub verify: bool,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            constraint_policy: ConstraintPolicy::default(),
            verify: true,
        }
    }
}

fn default_localhost() -> String {
    "localhost".to_string()
}

fn default_true() -> bool {
    true
}
