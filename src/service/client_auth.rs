use crate::db::{ClientId, ClientSecretStore};
use crate::error::MarathonError;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, info};

/// Authenticates inbound API callers by their client application's secret.
pub struct ClientAuthenticator<S: ClientSecretStore + ?Sized> {
    store: Arc<S>,
}

impl<S: ClientSecretStore + ?Sized> Clone for ClientAuthenticator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: ClientSecretStore + ?Sized> ClientAuthenticator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Constant-time comparison against the stored secret. An unknown client
    /// or one without a secret never verifies.
    pub async fn verify(&self, client_id: ClientId, presented: &[u8]) -> Result<bool, MarathonError> {
        let stored = match self.store.get_secret(client_id).await {
            Ok(secret) => secret,
            Err(e) if e.is_not_found() => {
                debug!(client_id, "secret check for unknown client");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        Ok(bool::from(stored.as_slice().ct_eq(presented)))
    }

    /// Replace the client's secret. Unknown clients are reported as NotFound.
    pub async fn rotate(&self, client_id: ClientId, secret: &[u8]) -> Result<(), MarathonError> {
        if secret.is_empty() {
            return Err(MarathonError::Validation(
                "client secret must not be empty".to_string(),
            ));
        }
        match self.store.set_secret(client_id, secret).await? {
            0 => Err(MarathonError::not_found("client", client_id)),
            _ => {
                info!(client_id, "client secret rotated");
                Ok(())
            }
        }
    }
}
