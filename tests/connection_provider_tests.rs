use marathon::config::DatabaseConfig;
use marathon::db::{self, PostgresStore};
use marathon::{ConnectionString, CredentialStore, NewLinkedAccount, Storage};
use std::time::{SystemTime, UNIX_EPOCH};

#[tokio::test]
async fn unreachable_postgres_fails_fast_with_connectivity_error() {
    let cfg = DatabaseConfig {
        host: "127.0.0.1".to_string(),
        // Nothing listens on the tcpmux port in a test environment.
        port: 1,
        connect_timeout_secs: 1,
        max_connections: 1,
        ..DatabaseConfig::default()
    };

    let err = match PostgresStore::connect(&cfg).await {
        Ok(_) => panic!("connecting to a closed port must fail"),
        Err(e) => e,
    };
    assert!(err.is_connectivity(), "unexpected error: {err}");
}

#[tokio::test]
async fn sqlite_url_selects_embedded_backend() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("marathon-connect-{}-{}.sqlite", std::process::id(), nanos));

    let cfg = DatabaseConfig {
        url: Some(format!("sqlite:{}", path.display())),
        max_connections: 2,
        ..DatabaseConfig::default()
    };

    let store = db::connect(&cfg).await.expect("sqlite connect failed");
    store.init_schema().await.unwrap();
    // Schema creation is idempotent.
    store.init_schema().await.unwrap();

    // Without a provisioned client the create path must fail cleanly.
    let err = store
        .create_linked_account(&NewLinkedAccount::new(
            1,
            "fitbit",
            "A1B2C3",
            ConnectionString::oauth2("a", "r").unwrap(),
        ))
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
    assert_eq!(
        store
            .lookup_user_by_platform_account("fitbit", "A1B2C3")
            .await
            .unwrap(),
        None
    );

    store.close().await;
    let _ = std::fs::remove_file(&path);
}
