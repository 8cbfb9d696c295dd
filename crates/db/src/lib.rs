pub mod dsn;
pub mod mssql;

pub use dsn::{is_sql_server, normalize_url, redact_url};
pub use mssql::SqlServerTarget;

use async_trait::async_trait;
use mssql::SqlServer;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use wsfl_models::{DatabaseConfig, ServiceError};

/// Liveness check behind `/healthz`.
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn ping(&self) -> Result<(), ServiceError>;

    /// Short backend name such as `postgres`, `sqlite` or `mssql`.
    fn backend(&self) -> &str;
}

enum Backend {
    Pool(AnyPool),
    SqlServer(SqlServer),
}

pub struct Database {
    inner: Backend,
    backend: String,
}

impl Database {
    /// Prepares the connection without opening it; the first ping connects.
    pub fn connect_lazy(url: &str, options: &DatabaseConfig) -> Result<Self, ServiceError> {
        if is_sql_server(url) {
            let target = SqlServerTarget::parse(url)?;
            info!(
                backend = "mssql",
                address = %target.address(),
                database = ?target.database,
                encrypt = target.encrypt,
                pre_ping = options.pre_ping,
                pool_recycle_secs = options.pool_recycle_secs,
                "SQL Server connection configured"
            );
            return Ok(Self {
                inner: Backend::SqlServer(SqlServer::new(target, options)),
                backend: "mssql".to_string(),
            });
        }

        sqlx::any::install_default_drivers();

        let url = normalize_url(url)?;
        let backend = url
            .split(':')
            .next()
            .unwrap_or_default()
            .to_string();

        let pool = AnyPoolOptions::new()
            .max_connections(options.max_connections)
            .test_before_acquire(options.pre_ping)
            .max_lifetime(Duration::from_secs(options.pool_recycle_secs))
            .acquire_timeout(Duration::from_secs(options.acquire_timeout_secs))
            .connect_lazy(&url)?;

        info!(
            backend = %backend,
            url = %redact_url(&url),
            max_connections = options.max_connections,
            pre_ping = options.pre_ping,
            pool_recycle_secs = options.pool_recycle_secs,
            "Database pool configured"
        );

        Ok(Self {
            inner: Backend::Pool(pool),
            backend,
        })
    }

    pub async fn close(&self) {
        match &self.inner {
            Backend::Pool(pool) => pool.close().await,
            Backend::SqlServer(server) => server.close().await,
        }
        info!(backend = %self.backend, "Database connections closed");
    }
}

#[async_trait]
impl DatabaseProbe for Database {
    #[instrument(skip(self), fields(backend = %self.backend))]
    async fn ping(&self) -> Result<(), ServiceError> {
        let started = Instant::now();
        let result = match &self.inner {
            Backend::Pool(pool) => sqlx::query("SELECT 1")
                .execute(pool)
                .await
                .map(|_| ())
                .map_err(ServiceError::Database),
            Backend::SqlServer(server) => server.ping().await,
        };

        match &result {
            Ok(()) => debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Database ping ok"),
            Err(e) => warn!("Database ping failed: {}", e),
        }
        result
    }

    fn backend(&self) -> &str {
        &self.backend
    }
}
