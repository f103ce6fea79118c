//! Database module: credential persistence behind backend-neutral traits.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and inputs
//! - `schema.rs`: SQL DDL for both dialects
//! - `sqlite.rs` / `postgres.rs`: the two `Storage` implementations
//! - `shared.rs`: the statement bodies both implementations expand

pub mod models;
pub mod postgres;
pub mod schema;
mod shared;
pub mod sqlite;

pub use models::{ClientId, DbLinkedAccount, NewLinkedAccount, UserId};
pub use postgres::{PgPool, PostgresStore};
pub use schema::{POSTGRES_INIT, SQLITE_INIT};
pub use sqlite::{SqlitePool, SqliteStore};

use crate::config::DatabaseConfig;
use crate::error::{MarathonError, Violation, violation_of};
use crate::types::{ConnectionString, OAuthTokens};
use async_trait::async_trait;
use std::sync::Arc;

/// Users, their linked platform accounts, and client memberships.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create a user, their first linked account and the client membership
    /// in one transaction. Returns the new user id.
    async fn create_linked_account(
        &self,
        account: &NewLinkedAccount,
    ) -> Result<UserId, MarathonError>;

    /// Link one more platform account to an existing user.
    async fn add_linked_account(
        &self,
        user_id: UserId,
        platform_name: &str,
        platform_user_id: &str,
        connection_string: &ConnectionString,
    ) -> Result<(), MarathonError>;

    /// Store fresh parameters for an already linked account and record that
    /// `client_id` serves the user, in one transaction. An unknown client or
    /// a missing linked account rolls both writes back.
    async fn relink(
        &self,
        user_id: UserId,
        client_id: ClientId,
        platform_name: &str,
        connection_string: &ConnectionString,
    ) -> Result<(), MarathonError>;

    /// `Ok(None)` when the platform account has not been linked yet.
    async fn lookup_user_by_platform_account(
        &self,
        platform_name: &str,
        platform_user_id: &str,
    ) -> Result<Option<UserId>, MarathonError>;

    async fn get_linked_account(
        &self,
        user_id: UserId,
        platform_name: &str,
    ) -> Result<DbLinkedAccount, MarathonError>;

    /// Platform names linked to `user_id`, in no particular order.
    async fn list_platform_names(&self, user_id: UserId) -> Result<Vec<String>, MarathonError>;

    /// Overwrite the stored parameters. Returns the affected row count.
    async fn update_connection_string(
        &self,
        user_id: UserId,
        platform_name: &str,
        connection_string: &ConnectionString,
    ) -> Result<u64, MarathonError>;

    async fn get_tokens(
        &self,
        user_id: UserId,
        platform_name: &str,
    ) -> Result<OAuthTokens, MarathonError> {
        self.get_linked_account(user_id, platform_name)
            .await?
            .connection_string()
            .oauth_tokens()
    }
}

/// Shared secrets of pre-provisioned client applications.
#[async_trait]
pub trait ClientSecretStore: Send + Sync {
    /// Overwrite the secret. Zero affected rows means no such client.
    async fn set_secret(&self, client_id: ClientId, secret: &[u8]) -> Result<u64, MarathonError>;

    async fn get_secret(&self, client_id: ClientId) -> Result<Vec<u8>, MarathonError>;
}

/// A connected backend holding every record type.
#[async_trait]
pub trait Storage: CredentialStore + ClientSecretStore {
    /// Initialize the schema by executing the bundled DDL.
    async fn init_schema(&self) -> Result<(), MarathonError>;

    async fn close(&self);
}

/// Open the backend selected by `cfg` and verify it is reachable.
pub async fn connect(cfg: &DatabaseConfig) -> Result<Arc<dyn Storage>, MarathonError> {
    match cfg.url.as_deref() {
        Some(url) if cfg.is_sqlite() => {
            let store = SqliteStore::connect(url, cfg.max_connections).await?;
            Ok(Arc::new(store))
        }
        _ => {
            let store = PostgresStore::connect(cfg).await?;
            Ok(Arc::new(store))
        }
    }
}

/// Classify a failed `credentials` insert.
pub(crate) fn linked_account_insert_error(
    e: sqlx::Error,
    user_id: UserId,
    platform_name: &str,
    platform_user_id: &str,
) -> MarathonError {
    match violation_of(&e) {
        Some(Violation::Unique) => MarathonError::Conflict(format!(
            "platform account {platform_name}:{platform_user_id} is already linked, \
             or user {user_id} already has a {platform_name} account"
        )),
        Some(Violation::ForeignKey) => MarathonError::not_found("user", user_id),
        None => e.into(),
    }
}

/// Classify a failed `userbase` insert.
pub(crate) fn membership_insert_error(e: sqlx::Error, client_id: ClientId) -> MarathonError {
    match violation_of(&e) {
        Some(Violation::ForeignKey) => MarathonError::not_found("client", client_id),
        _ => e.into(),
    }
}

pub(crate) fn linked_account_key(user_id: UserId, platform_name: &str) -> String {
    format!("user {user_id} on {platform_name}")
}
