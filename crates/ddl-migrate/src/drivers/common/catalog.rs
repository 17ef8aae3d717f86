//! `INFORMATION_SCHEMA` count queries.

use crate::core::traits::Dialect;

/// Build `SELECT COUNT(*) FROM <view> WHERE <schema_filter> AND F(col) = p ...`.
///
/// `F` is the dialect's case-folding function and each compared column gets
/// the next placeholder, so the caller passes folded names in column order.
pub fn count_query(
    dialect: &dyn Dialect,
    view: &str,
    schema_filter: &str,
    columns: &[&str],
) -> String {
    let fold = dialect.case_folding().sql_function();
    let mut sql = format!("SELECT COUNT(*) FROM {} WHERE {}", view, schema_filter);
    for (i, column) in columns.iter().enumerate() {
        sql.push_str(&format!(
            " AND {}({}) = {}",
            fold,
            column,
            dialect.param_placeholder(i + 1)
        ));
    }
    sql
}
