use crate::db::schema::SQLITE_INIT;
use crate::db::shared::impl_storage;
use crate::error::MarathonError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` with
    /// foreign keys enforced.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, MarathonError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_opts)
            .await?;
        debug!(database_url, "sqlite pool connected");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl_storage!(SqliteStore, Sqlite, SQLITE_INIT);
