//! Identifier validation and case folding.
//!
//! Generated DDL uses identifiers verbatim (no quoting), so every table,
//! column and constraint name entering the schema model is validated here
//! first. Names that could not appear unquoted in a statement are rejected.
//!
//! Case folding mirrors how each backend stores unquoted identifiers in its
//! catalog: HSQL folds to upper case, PostgreSQL and MySQL to lower case.
//! Introspection folds both sides of a comparison the same way.

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};

/// Maximum identifier length (conservative limit across databases).
/// - PostgreSQL: 63 bytes
/// - HSQL: 128 characters
/// - MySQL: 64 characters
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate an identifier before it is embedded in DDL.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes
/// - Identifiers exceeding maximum length
/// - Identifiers that do not start with a letter or underscore
/// - Characters other than ASCII letters, digits, `_` and `$`
///
/// # Errors
///
/// Returns `MigrateError::InvalidSchema` with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MigrateError::InvalidSchema(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(MigrateError::InvalidSchema(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(MigrateError::InvalidSchema(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    let mut chars = name.chars();
    let first_ok = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if !first_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
        return Err(MigrateError::InvalidSchema(format!(
            "Identifier {:?} cannot be used unquoted in DDL",
            name
        )));
    }

    Ok(())
}

/// How a backend stores unquoted identifiers in its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFolding {
    Upper,
    Lower,
}

impl CaseFolding {
    /// Fold an identifier the way the backend does.
    pub fn apply(&self, name: &str) -> String {
        match self {
            CaseFolding::Upper => name.to_ascii_uppercase(),
            CaseFolding::Lower => name.to_ascii_lowercase(),
        }
    }

    /// SQL function applying the same fold to a catalog column.
    pub fn sql_function(&self) -> &'static str {
        match self {
            CaseFolding::Upper => "UPPER",
            CaseFolding::Lower => "LOWER",
        }
    }
}
