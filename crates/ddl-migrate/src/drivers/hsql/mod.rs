//! HSQLDB dialect.
//!
//! HSQLDB is generate-only: there is no native Rust client, so scripts are
//! rendered with [`HsqlDialect`] and applied by other tooling.

mod dialect;

pub use dialect::HsqlDialect;
