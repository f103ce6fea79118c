mod support;

use marathon::service::ClientAuthenticator;
use marathon::{ClientSecretStore, MarathonError};
use support::TestDb;

#[tokio::test]
async fn set_then_get_secret() {
    let db = TestDb::new("secret").await;
    let client_id = db.insert_client("web").await;

    let rows = db.store.set_secret(client_id, b"my_secret").await.unwrap();
    assert_eq!(rows, 1);
    assert_eq!(db.store.get_secret(client_id).await.unwrap(), b"my_secret".to_vec());

    // Rotation overwrites.
    db.store.set_secret(client_id, b"rotated").await.unwrap();
    assert_eq!(db.store.get_secret(client_id).await.unwrap(), b"rotated".to_vec());
}

#[tokio::test]
async fn unknown_client_affects_no_rows_and_is_not_found() {
    let db = TestDb::new("secret-unknown").await;

    let rows = db.store.set_secret(77, b"my_secret").await.expect("zero rows is not an error");
    assert_eq!(rows, 0);

    let err = db.store.get_secret(77).await.unwrap_err();
    assert!(
        matches!(err, MarathonError::NotFound { entity: "client", .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn client_without_secret_is_not_found() {
    let db = TestDb::new("secret-unset").await;
    let client_id = db.insert_client("web").await;

    let err = db.store.get_secret(client_id).await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[tokio::test]
async fn authenticator_verifies_presented_secret() {
    let db = TestDb::new("secret-verify").await;
    let client_id = db.insert_client("web").await;
    let auth = ClientAuthenticator::new(db.store.clone());

    auth.rotate(client_id, b"s3cr3t").await.unwrap();

    assert!(auth.verify(client_id, b"s3cr3t").await.unwrap());
    assert!(!auth.verify(client_id, b"s3cr3").await.unwrap());
    assert!(!auth.verify(client_id, b"wrong!").await.unwrap());
    assert!(!auth.verify(client_id + 1, b"s3cr3t").await.unwrap());
}

#[tokio::test]
async fn authenticator_rotate_reports_unknown_client() {
    let db = TestDb::new("secret-rotate").await;
    let auth = ClientAuthenticator::new(db.store.clone());

    let err = auth.rotate(5, b"s3cr3t").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");

    let client_id = db.insert_client("web").await;
    let err = auth.rotate(client_id, b"").await.unwrap_err();
    assert!(matches!(err, MarathonError::Validation(_)));
}
