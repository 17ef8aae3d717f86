//! Schema introspection against a live connection.
//!
//! Every check is a catalog `COUNT(*)` query supplied by the dialect. The
//! dialect folds the catalog column; the introspector folds the parameter the
//! same way, so `T_TEST`, `t_test` and `T_test` all find the same table.

use tracing::debug;

use crate::core::traits::{Dialect, SchemaConnection};
use crate::error::Result;

/// Read-only catalog queries for one connection and dialect.
pub struct SchemaIntrospector<'a, C: SchemaConnection + ?Sized> {
    conn: &'a C,
    dialect: &'a dyn Dialect,
}

impl<'a, C: SchemaConnection + ?Sized> SchemaIntrospector<'a, C> {
    pub fn new(conn: &'a C, dialect: &'a dyn Dialect) -> Self {
        Self { conn, dialect }
    }

    fn fold(&self, name: &str) -> String {
        self.dialect.case_folding().apply(name)
    }

    /// Check whether a table exists in the current schema.
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let sql = self.dialect.table_exists_query();
        let count = self.conn.query_count(&sql, &[self.fold(table)]).await?;
        debug!("table_exists({}) = {}", table, count > 0);
        Ok(count > 0)
    }

    /// Check whether a column exists on a table.
    pub async fn column_exists(&self, table: &str, column: &str) -> Result<bool> {
        let sql = self.dialect.column_exists_query();
        let count = self
            .conn
            .query_count(&sql, &[self.fold(table), self.fold(column)])
            .await?;
        debug!("column_exists({}.{}) = {}", table, column, count > 0);
        Ok(count > 0)
    }

    /// Check whether a named constraint exists on a table.
    pub async fn constraint_exists(&self, table: &str, constraint: &str) -> Result<bool> {
        let sql = self.dialect.constraint_exists_query();
        let count = self
            .conn
            .query_count(&sql, &[self.fold(table), self.fold(constraint)])
            .await?;
        debug!("constraint_exists({}.{}) = {}", table, constraint, count > 0);
        Ok(count > 0)
    }

    /// Number of rows in a table.
    pub async fn row_count(&self, table: &str) -> Result<i64> {
        let sql = self.dialect.row_count_query(table);
        self.conn.query_count(&sql, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{HsqlDialect, PostgresDialect};
    use crate::testing::FakeConnection;

    #[tokio::test]
    async fn test_table_and_column_exist() {
        let conn = FakeConnection::new();
        conn.execute("CREATE TABLE t_task (\n  pk INT4,\n  code VARCHAR(10)\n)")
            .await
            .unwrap();

        let dialect = PostgresDialect::new();
        let introspector = SchemaIntrospector::new(&conn, &dialect);
        assert!(introspector.table_exists("t_task").await.unwrap());
        assert!(!introspector.table_exists("t_user").await.unwrap());
        assert!(introspector.column_exists("t_task", "code").await.unwrap());
        assert!(!introspector.column_exists("t_task", "missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_case_folding_is_applied_to_parameters() {
        let conn = FakeConnection::new();
        conn.execute("CREATE TABLE t_task (\n  PK INT\n)").await.unwrap();

        let dialect = HsqlDialect::new();
        let introspector = SchemaIntrospector::new(&conn, &dialect);
        assert!(introspector.table_exists("T_TASK").await.unwrap());
        assert!(introspector.table_exists("t_Task").await.unwrap());
        assert!(introspector.column_exists("t_task", "pk").await.unwrap());

        let queries = conn.queries();
        assert!(queries
            .iter()
            .any(|(_, params)| params == &vec!["T_TASK".to_string()]));
    }

    #[tokio::test]
    async fn test_constraint_exists_and_row_count() {
        let conn = FakeConnection::new();
        conn.execute("CREATE TABLE t_right (\n  a INT4,\n  b INT4\n)").await.unwrap();
        conn.execute("ALTER TABLE t_right ADD CONSTRAINT t_right_key UNIQUE (a, b)")
            .await
            .unwrap();
        conn.insert_rows("t_right", 3);

        let dialect = PostgresDialect::new();
        let introspector = SchemaIntrospector::new(&conn, &dialect);
        assert!(introspector.constraint_exists("t_right", "T_RIGHT_KEY").await.unwrap());
        assert!(!introspector.constraint_exists("t_right", "other").await.unwrap());
        assert_eq!(introspector.row_count("t_right").await.unwrap(), 3);
    }
}
