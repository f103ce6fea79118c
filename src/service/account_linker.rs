use crate::db::{ClientId, CredentialStore, NewLinkedAccount, UserId};
use crate::error::MarathonError;
use crate::types::ConnectionString;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of linking an authorized platform account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The account was already linked; its stored tokens were replaced and
    /// the client recorded as serving the user.
    Existing(UserId),
    /// A new user was created together with the linked account.
    Created(UserId),
}

impl LinkOutcome {
    pub fn user_id(&self) -> UserId {
        match *self {
            LinkOutcome::Existing(id) | LinkOutcome::Created(id) => id,
        }
    }
}

/// Entry point for a completed platform authorization: resolve the platform
/// account to a local user, or bring a new one into existence.
pub struct AccountLinker<S: CredentialStore + ?Sized> {
    store: Arc<S>,
}

impl<S: CredentialStore + ?Sized> Clone for AccountLinker<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: CredentialStore + ?Sized> AccountLinker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn link(
        &self,
        client_id: ClientId,
        platform_name: &str,
        platform_user_id: &str,
        connection_string: ConnectionString,
    ) -> Result<LinkOutcome, MarathonError> {
        if let Some(user_id) = self
            .store
            .lookup_user_by_platform_account(platform_name, platform_user_id)
            .await?
        {
            self.store
                .relink(user_id, client_id, platform_name, &connection_string)
                .await?;
            debug!(user_id, client_id, platform = %platform_name, "existing platform account re-authorized");
            return Ok(LinkOutcome::Existing(user_id));
        }

        let account =
            NewLinkedAccount::new(client_id, platform_name, platform_user_id, connection_string);
        let user_id = self.store.create_linked_account(&account).await?;
        info!(user_id, client_id, platform = %platform_name, "new user registered");
        Ok(LinkOutcome::Created(user_id))
    }
}
