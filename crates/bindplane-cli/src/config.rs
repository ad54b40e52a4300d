//! CLI configuration from environment variables.

use anyhow::{bail, Context, Result};
use bindplane_client::{ClientConfig, DEFAULT_TIMEOUT};
use std::time::Duration;
use url::Url;

/// Settings needed to reach the control plane.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Client configuration
    pub client: ClientConfig,
    /// Request timeout override
    pub timeout: Duration,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BINDPLANE_REMOTE_URL`: control plane address
    /// - `BINDPLANE_USERNAME` / `BINDPLANE_PASSWORD`: basic auth credentials
    /// - `BINDPLANE_API_KEY`: API key
    /// - `BINDPLANE_TLS_CA`: PEM bundle of certificate authorities to trust
    /// - `BINDPLANE_TIMEOUT_SECS`: request timeout in seconds
    ///
    /// # Errors
    ///
    /// Returns error if a variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut client = ClientConfig::default();

        if let Some(remote_url) = lookup("BINDPLANE_REMOTE_URL") {
            let parsed = Url::parse(&remote_url).context("Invalid BINDPLANE_REMOTE_URL")?;
            if !matches!(parsed.scheme(), "http" | "https") {
                bail!("BINDPLANE_REMOTE_URL must use http or https, got {}", parsed.scheme());
            }
            client.remote_url = remote_url.trim_end_matches('/').to_string();
        }

        if let Some(username) = lookup("BINDPLANE_USERNAME") {
            client.auth.username = username;
        }

        if let Some(password) = lookup("BINDPLANE_PASSWORD") {
            client.auth.password = password;
        }

        if let Some(api_key) = lookup("BINDPLANE_API_KEY") {
            client.auth.api_key = api_key;
        }

        if let Some(bundle) = lookup("BINDPLANE_TLS_CA").filter(|b| !b.trim().is_empty()) {
            client.certificate_authorities = vec![bundle];
        }

        let timeout = match lookup("BINDPLANE_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .context("Invalid BINDPLANE_TIMEOUT_SECS")?,
            ),
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self { client, timeout })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = CliConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.client.remote_url, "http://localhost:3001");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.client.certificate_authorities.is_empty());
    }

    #[test]
    fn reads_all_variables() {
        let config = CliConfig::from_lookup(lookup(&[
            ("BINDPLANE_REMOTE_URL", "https://bindplane.example.com/"),
            ("BINDPLANE_USERNAME", "admin"),
            ("BINDPLANE_PASSWORD", "secret"),
            ("BINDPLANE_API_KEY", "key"),
            ("BINDPLANE_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();

        assert_eq!(config.client.remote_url, "https://bindplane.example.com");
        assert_eq!(config.client.auth.username, "admin");
        assert_eq!(config.client.auth.password, "secret");
        assert_eq!(config.client.auth.api_key, "key");
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn rejects_bad_url() {
        assert!(CliConfig::from_lookup(lookup(&[("BINDPLANE_REMOTE_URL", "not a url")])).is_err());
        assert!(
            CliConfig::from_lookup(lookup(&[("BINDPLANE_REMOTE_URL", "ftp://bp.local")])).is_err()
        );
    }

    #[test]
    fn rejects_bad_timeout() {
        assert!(CliConfig::from_lookup(lookup(&[("BINDPLANE_TIMEOUT_SECS", "soon")])).is_err());
    }

    #[test]
    fn ca_bundle_is_one_entry() {
        let bundle = "-----BEGIN CERTIFICATE-----\nAAA\n-----END CERTIFICATE-----\n\
                      -----BEGIN CERTIFICATE-----\nBBB\n-----END CERTIFICATE-----\n";
        let config = CliConfig::from_lookup(lookup(&[("BINDPLANE_TLS_CA", bundle)])).unwrap();
        assert_eq!(config.client.certificate_authorities, vec![bundle.to_string()]);
    }

    #[test]
    fn blank_ca_bundle_is_ignored() {
        let config = CliConfig::from_lookup(lookup(&[("BINDPLANE_TLS_CA", "  \n")])).unwrap();
        assert!(config.client.certificate_authorities.is_empty());
    }
}
