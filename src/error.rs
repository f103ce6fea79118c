use reqwest::StatusCode;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum MarathonError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Malformed data: {0}")]
    MalformedData(String),

    #[error("Database unreachable: {0}")]
    Connectivity(#[source] SqlxError),

    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("Platform API error: {0}")]
    PlatformApi(String),
}

impl MarathonError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

impl From<SqlxError> for MarathonError {
    fn from(e: SqlxError) -> Self {
        match e {
            SqlxError::Io(_)
            | SqlxError::Tls(_)
            | SqlxError::Protocol(_)
            | SqlxError::PoolTimedOut
            | SqlxError::PoolClosed
            | SqlxError::WorkerCrashed => MarathonError::Connectivity(e),
            other => MarathonError::Database(other),
        }
    }
}

impl From<figment::Error> for MarathonError {
    fn from(e: figment::Error) -> Self {
        MarathonError::Config(Box::new(e))
    }
}

/// Constraint violation reported by the storage engine, if any.
pub(crate) enum Violation {
    Unique,
    ForeignKey,
}

pub(crate) fn violation_of(e: &SqlxError) -> Option<Violation> {
    let SqlxError::Database(db_err) = e else {
        return None;
    };
    if db_err.is_unique_violation() {
        Some(Violation::Unique)
    } else if db_err.is_foreign_key_violation() {
        Some(Violation::ForeignKey)
    } else {
        None
    }
}
