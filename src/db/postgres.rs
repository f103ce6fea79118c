//! PostgreSQL backend.
//!
//! This is the connection provider used in deployments: the pool is built from discrete
//! host/port/credential settings and checked with a ping before it is handed
//! out.

use crate::config::DatabaseConfig;
use crate::db::schema::POSTGRES_INIT;
use crate::db::shared::impl_storage;
use crate::error::MarathonError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{Connection, Pool, Postgres};
use std::str::FromStr;
use tracing::info;

pub type PgPool = Pool<Postgres>;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build the pool from `cfg` and round-trip a ping. No retry: an
    /// unreachable server surfaces as [`MarathonError::Connectivity`].
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, MarathonError> {
        let connect_opts = connect_options(cfg)?;
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(cfg.connect_timeout())
            .connect_with(connect_opts)
            .await?;

        let mut conn = pool.acquire().await?;
        conn.ping().await?;
        drop(conn);

        info!(
            host = %cfg.host,
            port = cfg.port,
            database = %cfg.name,
            "postgres pool connected"
        );
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connection target from either the explicit URL or the discrete settings.
pub fn connect_options(cfg: &DatabaseConfig) -> Result<PgConnectOptions, MarathonError> {
    if let Some(url) = cfg.url.as_deref() {
        return Ok(PgConnectOptions::from_str(url)?);
    }
    let ssl_mode = PgSslMode::from_str(&cfg.ssl_mode).map_err(|_| {
        MarathonError::Validation(format!("unknown ssl mode `{}`", cfg.ssl_mode))
    })?;
    Ok(PgConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.user)
        .password(&cfg.password)
        .database(&cfg.name)
        .ssl_mode(ssl_mode))
}

impl_storage!(PostgresStore, Postgres, POSTGRES_INIT);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discrete_settings_build_options() {
        let cfg = DatabaseConfig {
            host: "db.internal".to_string(),
            port: 6543,
            name: "marathon_test".to_string(),
            ..DatabaseConfig::default()
        };
        let opts = connect_options(&cfg).unwrap();
        assert_eq!(opts.get_host(), "db.internal");
        assert_eq!(opts.get_port(), 6543);
        assert_eq!(opts.get_database(), Some("marathon_test"));
    }

    #[test]
    fn bad_ssl_mode_is_a_validation_error() {
        let cfg = DatabaseConfig {
            ssl_mode: "maybe".to_string(),
            ..DatabaseConfig::default()
        };
        assert!(matches!(
            connect_options(&cfg),
            Err(MarathonError::Validation(_))
        ));
    }
}
