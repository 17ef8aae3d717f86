//! PostgreSQL schema connection.
//!
//! Uses deadpool-postgres with a pool of exactly one connection. The single
//! client is checked out when the connection is opened and held until
//! `close`, so every statement of a migration run goes over the same session.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use tokio::sync::Mutex;
use tokio_postgres::types::ToSql;
use tokio_postgres::Config as PgConfig;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::core::traits::SchemaConnection;
use crate::drivers::common::tls::postgres_connector;
use crate::error::{MigrateError, Result};

/// Connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// A single PostgreSQL session used for one migration run.
pub struct PostgresConnection {
    // Declared before the pool so the client is returned first on drop
    client: Mutex<Option<Object>>,
    pool: Pool,
}

impl PostgresConnection {
    /// Open a connection from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let port = config.port_or_default();

        let mut pg_config = PgConfig::new();
        pg_config.host(&config.host);
        pg_config.port(port);
        pg_config.dbname(&config.database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);
        pg_config.application_name("ddl-migrate");
        pg_config.connect_timeout(CONNECT_TIMEOUT);

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let pool = match postgres_connector(config.ssl_mode)? {
            None => {
                warn!("PostgreSQL TLS is disabled. Credentials will be transmitted in plaintext.");
                let mgr = Manager::from_config(pg_config, tokio_postgres::NoTls, mgr_config);
                Pool::builder(mgr)
                    .max_size(1)
                    .build()
                    .map_err(|e| MigrateError::pool(e, "creating PostgreSQL pool"))?
            }
            Some(tls) => {
                let mgr = Manager::from_config(pg_config, tls, mgr_config);
                Pool::builder(mgr)
                    .max_size(1)
                    .build()
                    .map_err(|e| MigrateError::pool(e, "creating PostgreSQL pool"))?
            }
        };

        let client = pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, "connecting to PostgreSQL"))?;

        info!(
            "Connected to PostgreSQL: {}:{}/{}",
            config.host, port, config.database
        );

        Ok(Self {
            client: Mutex::new(Some(client)),
            pool,
        })
    }
}

/// Server message for database errors, the driver's text otherwise.
fn error_text(e: &tokio_postgres::Error) -> String {
    match e.as_db_error() {
        Some(db) => format!("{} ({})", db.message(), db.code().code()),
        None => e.to_string(),
    }
}

fn closed(sql: &str) -> MigrateError {
    MigrateError::execution(sql, "connection already closed")
}

#[async_trait]
impl SchemaConnection for PostgresConnection {
    fn db_type(&self) -> &str {
        "postgres"
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        debug!("Executing: {}", sql);
        let guard = self.client.lock().await;
        let client = guard.as_ref().ok_or_else(|| closed(sql))?;
        client
            .execute(sql, &[])
            .await
            .map_err(|e| MigrateError::execution(sql, error_text(&e)))
    }

    async fn query_count(&self, sql: &str, params: &[String]) -> Result<i64> {
        let params: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let guard = self.client.lock().await;
        let client = guard.as_ref().ok_or_else(|| closed(sql))?;
        let row = client
            .query_one(sql, &params)
            .await
            .map_err(|e| MigrateError::execution(sql, error_text(&e)))?;
        row.try_get::<_, i64>(0)
            .map_err(|e| MigrateError::execution(sql, error_text(&e)))
    }

    async fn ping(&self) -> Result<()> {
        let guard = self.client.lock().await;
        let client = guard.as_ref().ok_or_else(|| closed("SELECT 1"))?;
        client
            .simple_query("SELECT 1")
            .await
            .map(|_| ())
            .map_err(|e| MigrateError::pool(error_text(&e), "testing PostgreSQL connection"))
    }

    async fn close(&self) {
        // Return the client before shutting the pool down
        drop(self.client.lock().await.take());
        self.pool.close();
        debug!("PostgreSQL connection closed");
    }
}
