//! Client configuration.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Credentials attached to every request.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Basic auth username
    pub username: String,
    /// Basic auth password
    pub password: String,
    /// API key, sent as `X-Bindplane-Api-Key` when non-empty
    pub api_key: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// BindPlane client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base address of the control plane (e.g., <https://bindplane.example.com>)
    pub remote_url: String,
    /// Authentication credentials
    pub auth: AuthConfig,
    /// PEM-encoded CA certificates to trust instead of the built-in roots
    pub certificate_authorities: Vec<String>,
    /// Request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            remote_url: "http://localhost:3001".to_string(),
            auth: AuthConfig::default(),
            certificate_authorities: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given control plane address.
    #[must_use]
    pub fn new(remote_url: impl Into<String>) -> Self {
        Self {
            remote_url: remote_url.into(),
            ..Self::default()
        }
    }

    /// Set basic auth credentials.
    #[must_use]
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth.username = username.into();
        self.auth.password = password.into();
        self
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.auth.api_key = api_key.into();
        self
    }

    /// Append a PEM-encoded CA certificate to the trust list.
    #[must_use]
    pub fn with_certificate_authority(mut self, pem: impl Into<String>) -> Self {
        self.certificate_authorities.push(pem.into());
        self
    }

    /// Set the request timeout. Zero falls back to the default.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Timeout actually applied by the client.
    pub(crate) fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.remote_url, "http://localhost:3001");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.auth.username.is_empty());
        assert!(config.auth.api_key.is_empty());
        assert!(config.certificate_authorities.is_empty());
    }

    #[test]
    fn builder_methods() {
        let config = ClientConfig::new("https://bindplane.example.com")
            .with_basic_auth("admin", "secret")
            .with_api_key("key-123")
            .with_certificate_authority("ca-one")
            .with_certificate_authority("ca-two")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.remote_url, "https://bindplane.example.com");
        assert_eq!(config.auth.username, "admin");
        assert_eq!(config.auth.password, "secret");
        assert_eq!(config.auth.api_key, "key-123");
        assert_eq!(config.certificate_authorities, vec!["ca-one", "ca-two"]);
        assert_eq!(config.effective_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn zero_timeout_uses_default() {
        let config = ClientConfig::default().with_timeout(Duration::ZERO);
        assert_eq!(config.effective_timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = ClientConfig::default()
            .with_basic_auth("admin", "hunter2")
            .with_api_key("key-123");
        let debug = format!("{config:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("key-123"));
    }

    #[test]
    fn deserialize_with_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"remote_url": "https://bp.local", "auth": {"api_key": "k"}, "timeout": 10}"#,
        )
        .unwrap();
        assert_eq!(config.remote_url, "https://bp.local");
        assert_eq!(config.auth.api_key, "k");
        assert!(config.auth.username.is_empty());
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.certificate_authorities.is_empty());
    }
}
