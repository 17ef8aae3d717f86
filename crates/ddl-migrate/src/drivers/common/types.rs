//! Type token formatting shared by all dialects.

use crate::core::{DEFAULT_DECIMAL, DEFAULT_VARCHAR_LENGTH};

/// `CHAR(n)`; a missing length means one character.
pub fn char_token(length: Option<u32>) -> String {
    format!("CHAR({})", length.unwrap_or(1))
}

/// `VARCHAR(n)`; a missing length falls back to the default.
pub fn varchar_token(length: Option<u32>) -> String {
    format!("VARCHAR({})", length.unwrap_or(DEFAULT_VARCHAR_LENGTH))
}

/// `DECIMAL(p, s)` with a space after the comma.
pub fn decimal_token(precision_scale: Option<(u32, u32)>) -> String {
    let (precision, scale) = precision_scale.unwrap_or(DEFAULT_DECIMAL);
    format!("DECIMAL({}, {})", precision, scale)
}
