//! Configuration validation.

use super::Config;
use crate::drivers::DialectImpl;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let db = &config.database;

    // Resolves the dialect identifier; unknown names fail here
    DialectImpl::from_db_type(&db.r#type)?;

    if db.host.is_empty() {
        return Err(MigrateError::Config("database.host is required".into()));
    }
    if db.database.is_empty() {
        return Err(MigrateError::Config("database.database is required".into()));
    }
    if db.user.is_empty() {
        return Err(MigrateError::Config("database.user is required".into()));
    }
    if let Some(0) = db.port {
        return Err(MigrateError::Config(
            "database.port must be between 1 and 65535".into(),
        ));
    }

    Ok(())
}
