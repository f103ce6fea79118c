use crate::error::MarathonError;
use crate::types::ConnectionString;
use sqlx::FromRow;

pub type UserId = i64;
pub type ClientId = i64;

/// Input of the transactional create path: a brand new user, their first
/// linked account, and the membership in the client they registered through.
#[derive(Debug, Clone)]
pub struct NewLinkedAccount {
    pub client_id: ClientId,
    pub platform_name: String,
    pub platform_user_id: String,
    pub connection_string: ConnectionString,
}

impl NewLinkedAccount {
    pub fn new(
        client_id: ClientId,
        platform_name: impl Into<String>,
        platform_user_id: impl Into<String>,
        connection_string: ConnectionString,
    ) -> Self {
        Self {
            client_id,
            platform_name: platform_name.into(),
            platform_user_id: platform_user_id.into(),
            connection_string,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), MarathonError> {
        validate_platform_account(&self.platform_name, &self.platform_user_id)
    }
}

pub(crate) fn validate_platform_account(
    platform_name: &str,
    platform_user_id: &str,
) -> Result<(), MarathonError> {
    if platform_name.trim().is_empty() {
        return Err(MarathonError::Validation(
            "platform name must not be empty".to_string(),
        ));
    }
    if platform_user_id.trim().is_empty() {
        return Err(MarathonError::Validation(
            "platform user id must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// One row of the `credentials` table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbLinkedAccount {
    pub id: i64,
    pub user_id: UserId,
    pub platform_name: String,
    pub platform_id: String,
    pub connection_string: String,
}

impl DbLinkedAccount {
    pub fn connection_string(&self) -> ConnectionString {
        ConnectionString::from_stored(self.connection_string.clone())
    }
}
