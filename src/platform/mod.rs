//! Third-party fitness platforms. Each adapter resolves the user's tokens
//! through the credential store and performs the REST call itself.

pub mod fitbit;

pub use fitbit::Fitbit;

use crate::db::UserId;
use crate::error::MarathonError;
use async_trait::async_trait;
use chrono::NaiveDate;

pub const FITBIT: &str = "fitbit";

#[async_trait]
pub trait Platform: Send + Sync {
    /// Platform name as stored in linked accounts.
    fn name(&self) -> &'static str;

    async fn get_steps(&self, user_id: UserId, date: NaiveDate) -> Result<u64, MarathonError>;

    async fn get_calories(&self, user_id: UserId, date: NaiveDate) -> Result<u64, MarathonError>;
}
