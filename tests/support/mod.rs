#![allow(dead_code)]

use marathon::Storage;
use marathon::db::{ClientId, SqliteStore};
use std::{
    path::PathBuf,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

/// A schema-initialized SQLite database in a unique temp file, removed on drop.
pub struct TestDb {
    pub store: Arc<SqliteStore>,
    path: PathBuf,
}

impl TestDb {
    pub async fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();

        let mut path = std::env::temp_dir();
        path.push(format!(
            "marathon-{}-{}-{}.sqlite",
            tag,
            std::process::id(),
            nanos
        ));

        let database_url = format!("sqlite:{}", path.display());
        let store = SqliteStore::connect(&database_url, 4)
            .await
            .expect("failed to open sqlite store");
        store.init_schema().await.expect("failed to init schema");

        Self {
            store: Arc::new(store),
            path,
        }
    }

    /// Client applications are provisioned outside the store.
    pub async fn insert_client(&self, name: &str) -> ClientId {
        sqlx::query_scalar("INSERT INTO client (name) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(self.store.pool())
            .await
            .expect("failed to insert client")
    }

    pub async fn count(&self, table: &str) -> i64 {
        let sql = format!(r#"SELECT COUNT(*) FROM "{table}""#);
        sqlx::query_scalar(&sql)
            .fetch_one(self.store.pool())
            .await
            .expect("failed to count rows")
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        for suffix in ["-wal", "-shm"] {
            let mut sidecar = self.path.clone().into_os_string();
            sidecar.push(suffix);
            let _ = std::fs::remove_file(sidecar);
        }
    }
}
