use crate::error::MarathonError;
use std::fmt;

/// Separator between the positional parameters of a connection string.
pub const DELIMITER: char = ';';

/// Auth scheme tag stored in position 0 for OAuth2 platforms.
pub const OAUTH2_SCHEME: &str = "oauth2";

/// Minimum field count for an OAuth2 connection string: scheme, access, refresh.
const OAUTH2_FIELDS: usize = 3;

/// Ordered, delimiter-joined credential parameters of one linked account.
///
/// Only constructible through [`ConnectionString::build`] (or the helpers built
/// on it), so a value always carries at least one parameter and every
/// parameter is non-empty and free of [`DELIMITER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl ConnectionString {
    /// Join `params` in the given order. Fails on an empty list, an empty
    /// parameter, or a parameter containing the delimiter.
    pub fn build<I, S>(params: I) -> Result<Self, MarathonError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut joined = String::new();
        let mut count = 0usize;
        for param in params {
            let param = param.as_ref();
            if param.is_empty() {
                return Err(MarathonError::Validation(format!(
                    "connection string parameter {count} is empty"
                )));
            }
            if param.contains(DELIMITER) {
                return Err(MarathonError::Validation(format!(
                    "connection string parameter {count} contains `{DELIMITER}`"
                )));
            }
            if count > 0 {
                joined.push(DELIMITER);
            }
            joined.push_str(param);
            count += 1;
        }
        if count == 0 {
            return Err(MarathonError::Validation(
                "connection string needs at least one parameter".to_string(),
            ));
        }
        Ok(Self(joined))
    }

    /// `oauth2;<access>;<refresh>`
    pub fn oauth2(access_token: &str, refresh_token: &str) -> Result<Self, MarathonError> {
        Self::build([OAUTH2_SCHEME, access_token, refresh_token])
    }

    /// Wrap a value read back from storage.
    pub(crate) fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Positional fields. A single trailing delimiter is ignored: built values
    /// never end with one, only rows written by the older format do.
    pub fn fields(&self) -> Vec<&str> {
        let trimmed = self.0.strip_suffix(DELIMITER).unwrap_or(&self.0);
        trimmed.split(DELIMITER).collect()
    }

    /// Access and refresh token from positions 1 and 2.
    pub fn oauth_tokens(&self) -> Result<OAuthTokens, MarathonError> {
        let fields = self.fields();
        if fields.len() < OAUTH2_FIELDS {
            return Err(MarathonError::MalformedData(format!(
                "connection string has {} field(s), expected at least {}",
                fields.len(),
                OAUTH2_FIELDS
            )));
        }
        Ok(OAuthTokens {
            access_token: fields[1].to_string(),
            refresh_token: fields[2].to_string(),
        })
    }
}

impl fmt::Display for ConnectionString {
    // Tokens must not leak into logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} field(s)>", self.fields().len())
    }
}
