use super::{FITBIT, Platform};
use crate::config::PlatformConfig;
use crate::db::{CredentialStore, UserId};
use crate::error::MarathonError;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Summary {
    #[serde(rename = "caloriesOut", default)]
    pub calories: u64,
    #[serde(default)]
    pub steps: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyActivity {
    #[serde(default)]
    pub summary: Summary,
    #[serde(default)]
    pub errors: Vec<HashMap<String, String>>,
}

pub struct Fitbit<S: CredentialStore + ?Sized> {
    store: Arc<S>,
    client: reqwest::Client,
    api_base: Url,
}

impl<S: CredentialStore + ?Sized> Fitbit<S> {
    pub fn new(store: Arc<S>, cfg: &PlatformConfig, timeout: Duration) -> Result<Self, MarathonError> {
        let client = reqwest::Client::builder()
            .user_agent("marathon/0.1")
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            store,
            client,
            api_base: cfg.api_base.clone(),
        })
    }

    /// `{api_base}/1/user/-/activities/date/{YYYY-MM-DD}.json`
    pub fn daily_activity_url(&self, date: NaiveDate) -> Result<Url, MarathonError> {
        let path = format!("1/user/-/activities/date/{}.json", date.format("%Y-%m-%d"));
        Ok(self.api_base.join(&path)?)
    }

    pub async fn get_daily_activity(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<DailyActivity, MarathonError> {
        let tokens = self.store.get_tokens(user_id, FITBIT).await?;
        let url = self.daily_activity_url(date)?;

        let resp = self
            .client
            .get(url)
            .bearer_auth(&tokens.access_token)
            .header("Accept", "application/json")
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        // Fitbit reports failures as an `errors` array, usually with a 4xx.
        let activity: DailyActivity = match serde_json::from_slice(&body) {
            Ok(activity) => activity,
            Err(_) if !status.is_success() => return Err(MarathonError::UpstreamStatus(status)),
            Err(e) => return Err(e.into()),
        };

        if !activity.errors.is_empty() {
            for (i, e) in activity.errors.iter().enumerate() {
                error!(
                    user_id,
                    error_type = e.get("errorType").map(String::as_str).unwrap_or("-"),
                    message = e.get("message").map(String::as_str).unwrap_or("-"),
                    "request to fitbit api failed - reason {i}"
                );
            }
            return Err(MarathonError::PlatformApi(
                "failed to request daily activity".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(MarathonError::UpstreamStatus(status));
        }

        debug!(user_id, %date, "fitbit daily activity fetched");
        Ok(activity)
    }
}

#[async_trait]
impl<S: CredentialStore + ?Sized> Platform for Fitbit<S> {
    fn name(&self) -> &'static str {
        FITBIT
    }

    async fn get_steps(&self, user_id: UserId, date: NaiveDate) -> Result<u64, MarathonError> {
        Ok(self.get_daily_activity(user_id, date).await?.summary.steps)
    }

    async fn get_calories(&self, user_id: UserId, date: NaiveDate) -> Result<u64, MarathonError> {
        Ok(self.get_daily_activity(user_id, date).await?.summary.calories)
    }
}
