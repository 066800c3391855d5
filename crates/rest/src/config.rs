//! Client configuration.
//!
//! Every field has a default, so an empty document (or [`RestConfig::default`])
//! is a valid configuration for unauthenticated requests against the public API.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::RestError;

/// API base used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://discord.com/api/v10";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_USER_AGENT: &str = concat!(
    "DiscordBot (",
    env!("CARGO_PKG_NAME"),
    ", ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Settings for [`crate::RestClient`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    /// Absolute `http(s)` URL prefixed to every route path.
    pub base_url: String,
    /// Bot token sent as `Authorization: Bot <token>`. `None` sends no header.
    pub token: Option<String>,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Whole-request timeout, in seconds.
    pub timeout_secs: u64,
    /// Connection establishment timeout, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl RestConfig {
    /// Default settings against another base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the bot token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Whole-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connection establishment timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Checks the settings and returns the parsed base URL.
    pub(crate) fn validate(&self) -> Result<Url, RestError> {
        let url = Url::parse(&self.base_url).map_err(|e| RestError::InvalidConfig {
            message: format!("base_url '{}' is not a valid URL: {e}", self.base_url),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RestError::InvalidConfig {
                message: format!("base_url '{}' must use http or https", self.base_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(RestError::InvalidConfig {
                message: "timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.token.as_deref().is_some_and(str::is_empty) {
            return Err(RestError::InvalidConfig {
                message: "token must not be empty when set".to_string(),
            });
        }
        Ok(url)
    }
}

impl std::fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_falls_back_to_defaults() {
        let config: RestConfig =
            serde_json::from_str(r#"{ "token": "abc", "timeout_secs": 5 }"#).unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let err = RestConfig::with_base_url("ftp://example.com")
            .validate()
            .unwrap_err();

        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn unparsable_base_url_is_rejected() {
        assert!(RestConfig::with_base_url("not a url").validate().is_err());
    }

    #[test]
    fn zero_timeout_and_empty_token_are_rejected() {
        let mut config = RestConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        assert!(RestConfig::default().token("").validate().is_err());
    }

    #[test]
    fn default_user_agent_names_crate_and_version() {
        let config = RestConfig::default();

        assert_eq!(
            config.user_agent,
            format!("DiscordBot (rest, {})", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn debug_output_redacts_token() {
        let rendered = format!("{:?}", RestConfig::default().token("super-secret"));

        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
