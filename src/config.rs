use crate::error::MarathonError;
use figment::Figment;
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const ENV_PREFIX: &str = "MARATHON_";
pub const FITBIT_API_BASE: &str = "https://api.fitbit.com";

const SSL_MODES: [&str; 6] = [
    "disable",
    "allow",
    "prefer",
    "require",
    "verify-ca",
    "verify-full",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub loglevel: String,
    /// Timeout for outbound platform API calls, in seconds.
    pub client_timeout_secs: u64,
    pub database: DatabaseConfig,
    pub fitbit: PlatformConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL. `sqlite:` URLs select the embedded backend and
    /// any other URL is handed to the PostgreSQL driver as is.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub api_base: Url,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
            client_timeout_secs: 2,
            database: DatabaseConfig::default(),
            fitbit: PlatformConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "marathon".to_string(),
            ssl_mode: "disable".to_string(),
            max_connections: 10,
            connect_timeout_secs: 30,
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(FITBIT_API_BASE).expect("FITBIT_API_BASE is a valid URL"),
        }
    }
}

// Manual impl keeps the password out of logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<set>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("name", &self.name)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Defaults, overridden by `MARATHON_*` environment variables
    /// (`MARATHON_DATABASE__HOST`, `MARATHON_FITBIT__API_BASE`, ...).
    pub fn load() -> Result<Self, MarathonError> {
        Self::from_figment(Self::figment())
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, MarathonError> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), MarathonError> {
        self.database.validate()
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }
}

impl DatabaseConfig {
    pub fn is_sqlite(&self) -> bool {
        self.url.as_deref().is_some_and(|u| u.starts_with("sqlite:"))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), MarathonError> {
        if self.max_connections == 0 {
            return Err(MarathonError::Validation(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.url.is_some() {
            return Ok(());
        }
        if self.host.trim().is_empty() {
            return Err(MarathonError::Validation(
                "database.host must not be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(MarathonError::Validation(
                "database.port must not be 0".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(MarathonError::Validation(
                "database.name must not be empty".to_string(),
            ));
        }
        if !SSL_MODES.contains(&self.ssl_mode.as_str()) {
            return Err(MarathonError::Validation(format!(
                "database.ssl_mode `{}` is not one of {:?}",
                self.ssl_mode, SSL_MODES
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert!(!cfg.database.is_sqlite());
        assert_eq!(cfg.fitbit.api_base.as_str(), "https://api.fitbit.com/");
    }

    #[test]
    fn nested_overrides_are_merged() {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Serialized::default("database.host", "db.internal"))
            .merge(Serialized::default("database.port", 6543));
        let cfg = Config::from_figment(figment).unwrap();
        assert_eq!(cfg.database.host, "db.internal");
        assert_eq!(cfg.database.port, 6543);
        assert_eq!(cfg.database.name, "marathon");
    }

    #[test]
    fn unknown_ssl_mode_is_rejected() {
        let mut cfg = Config::default();
        cfg.database.ssl_mode = "sometimes".to_string();
        assert!(matches!(cfg.validate(), Err(MarathonError::Validation(_))));
    }

    #[test]
    fn url_skips_discrete_field_checks() {
        let mut cfg = Config::default();
        cfg.database.host.clear();
        cfg.database.url = Some("sqlite::memory:".to_string());
        assert!(cfg.validate().is_ok());
        assert!(cfg.database.is_sqlite());
    }

    #[test]
    fn debug_output_hides_password() {
        let mut db = DatabaseConfig::default();
        db.password = "hunter2".to_string();
        assert!(!format!("{db:?}").contains("hunter2"));
    }
}
