//! Error types for the schema migration engine.

use thiserror::Error;

/// Main error type for schema migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, unknown dialect, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested DDL shape has no known rendering for the active dialect.
    #[error("Dialect '{dialect}' does not support {feature}")]
    UnsupportedDialectFeature { dialect: String, feature: String },

    /// A schema model invariant was violated while building a table or attribute.
    #[error("Invalid schema definition: {0}")]
    InvalidSchema(String),

    /// The live schema is in a state that makes the step unsafe (e.g. dropping
    /// a table that still holds rows). Only the current step is aborted.
    #[error("Schema conflict on table {table}: {message}")]
    SchemaConflict { table: String, message: String },

    /// The database rejected a statement.
    #[error("Statement failed: {message}\n  Statement: {statement}")]
    Execution { statement: String, message: String },

    /// A statement ran but the post-execution catalog check did not confirm it.
    #[error("Verification failed for table {table}: {message}")]
    Verification { table: String, message: String },

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        MigrateError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create an UnsupportedDialectFeature error
    pub fn unsupported(dialect: impl Into<String>, feature: impl Into<String>) -> Self {
        MigrateError::UnsupportedDialectFeature {
            dialect: dialect.into(),
            feature: feature.into(),
        }
    }

    /// Create a SchemaConflict error
    pub fn conflict(table: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::SchemaConflict {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create an Execution error carrying the rejected statement and the
    /// database's own error text.
    pub fn execution(statement: impl Into<String>, message: impl ToString) -> Self {
        MigrateError::Execution {
            statement: statement.into(),
            message: message.to_string(),
        }
    }

    /// Create a Verification error
    pub fn verification(table: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Verification {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Whether this error is detected before any DDL is sent.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            MigrateError::UnsupportedDialectFeature { .. } | MigrateError::InvalidSchema(_)
        )
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Yaml(_) | MigrateError::Io(_) => 2,
            MigrateError::UnsupportedDialectFeature { .. } | MigrateError::InvalidSchema(_) => 3,
            MigrateError::SchemaConflict { .. } => 4,
            MigrateError::Pool { .. } => 5,
            MigrateError::Execution { .. }
            | MigrateError::Verification { .. }
            | MigrateError::Json(_) => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        // Add error chain for wrapped errors
        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
