//! MySQL/MariaDB schema connection.
//!
//! Built on mysql_async with a pool capped at one connection. The connection
//! is checked out up front and guarded by a mutex so statements run strictly
//! one after another on the same session.

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, Opts, OptsBuilder, Params, Pool, PoolConstraints, PoolOpts, SslOpts};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{DatabaseConfig, SslMode};
use crate::core::traits::SchemaConnection;
use crate::error::{MigrateError, Result};

/// A single MySQL session used for one migration run.
pub struct MysqlConnection {
    conn: Mutex<Option<Conn>>,
    pool: Pool,
}

impl MysqlConnection {
    /// Open a connection from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let port = config.port_or_default();

        let ssl_opts = match config.ssl_mode {
            SslMode::Disable => {
                warn!("MySQL TLS is disabled. Credentials will be transmitted in plaintext.");
                None
            }
            SslMode::Require => Some(SslOpts::default().with_danger_accept_invalid_certs(true)),
            SslMode::VerifyCa => {
                Some(SslOpts::default().with_danger_skip_domain_validation(true))
            }
            SslMode::VerifyFull => Some(SslOpts::default()),
        };

        let constraints = PoolConstraints::new(1, 1)
            .ok_or_else(|| MigrateError::Config("invalid MySQL pool constraints".into()))?;

        let mut builder = OptsBuilder::default()
            .ip_or_hostname(&config.host)
            .tcp_port(port)
            .db_name(Some(&config.database))
            .user(Some(&config.user))
            .pass(Some(&config.password))
            .init(vec!["SET NAMES utf8mb4"])
            .pool_opts(PoolOpts::new().with_constraints(constraints));

        if let Some(ssl) = ssl_opts {
            builder = builder.ssl_opts(ssl);
        }

        let opts: Opts = builder.into();
        let pool = Pool::new(opts);

        let conn = pool
            .get_conn()
            .await
            .map_err(|e| MigrateError::pool(e, "connecting to MySQL"))?;

        info!(
            "Connected to MySQL: {}:{}/{}",
            config.host, port, config.database
        );

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            pool,
        })
    }
}

fn closed(sql: &str) -> MigrateError {
    MigrateError::execution(sql, "connection already closed")
}

#[async_trait]
impl SchemaConnection for MysqlConnection {
    fn db_type(&self) -> &str {
        "mysql"
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        debug!("Executing: {}", sql);
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(|| closed(sql))?;
        conn.query_drop(sql)
            .await
            .map_err(|e| MigrateError::execution(sql, e))?;
        Ok(conn.affected_rows())
    }

    async fn query_count(&self, sql: &str, params: &[String]) -> Result<i64> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(|| closed(sql))?;
        let params = if params.is_empty() {
            Params::Empty
        } else {
            Params::from(params.to_vec())
        };
        let count: Option<i64> = conn
            .exec_first(sql, params)
            .await
            .map_err(|e| MigrateError::execution(sql, e))?;
        Ok(count.unwrap_or(0))
    }

    async fn ping(&self) -> Result<()> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(|| closed("SELECT 1"))?;
        conn.ping()
            .await
            .map_err(|e| MigrateError::pool(e, "testing MySQL connection"))
    }

    async fn close(&self) {
        if let Some(conn) = self.conn.lock().await.take() {
            if let Err(e) = conn.disconnect().await {
                warn!("Error closing MySQL connection: {}", e);
            }
        }
        if let Err(e) = self.pool.clone().disconnect().await {
            warn!("Error closing MySQL pool: {}", e);
        }
    }
}
