//! HTTP client for the BindPlane v1 API.
//!
//! Every operation is a single request/response round trip. Status codes
//! above 399 are reported as [`ClientError::Api`] with the raw response body,
//! except for [`BindPlane::version`], which performs no status check.

use crate::config::ClientConfig;
use crate::model::{
    ApplyPayload, ApplyResponse, Configuration, ConfigurationResponse, Resource, ResourceStatus,
    StartRolloutPayload, Version,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{tls, Client, RequestBuilder, StatusCode};
use rustls::RootCertStore;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Header carrying the API key.
pub const KEY_HEADER: &str = "X-Bindplane-Api-Key";

/// Settings that options may adjust before the transport is built.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Request timeout
    pub timeout: Duration,
}

/// A fallible mutator applied to [`ClientSettings`] during construction.
pub type ClientOption = Box<dyn FnOnce(&mut ClientSettings) -> Result<(), ClientError> + Send>;

/// Override the request timeout. A zero duration leaves the timeout unchanged.
#[must_use]
pub fn with_timeout(timeout: Duration) -> ClientOption {
    Box::new(move |settings| {
        if !timeout.is_zero() {
            settings.timeout = timeout;
        }
        Ok(())
    })
}

/// Client for the BindPlane control plane.
#[derive(Debug, Clone)]
pub struct BindPlane {
    client: Client,
    config: ClientConfig,
    base_url: String,
    timeout: Duration,
}

impl BindPlane {
    /// Create a new BindPlane client.
    ///
    /// Options are applied in order after the defaults. No network I/O
    /// happens here.
    ///
    /// # Errors
    ///
    /// Returns error if a certificate authority is not valid PEM, if an
    /// option fails, or if the HTTP client cannot be created.
    pub fn new(
        config: ClientConfig,
        options: impl IntoIterator<Item = ClientOption>,
    ) -> Result<Self, ClientError> {
        let headers = auth_headers(&config)?;
        let roots = parse_certificate_authorities(&config.certificate_authorities)?;

        let mut settings = ClientSettings {
            timeout: config.effective_timeout(),
        };
        for option in options {
            option(&mut settings).map_err(|e| ClientError::Option(e.to_string()))?;
        }

        let mut builder = Client::builder()
            .use_rustls_tls()
            .min_tls_version(tls::Version::TLS_1_3)
            .timeout(settings.timeout)
            .default_headers(headers);

        if !roots.is_empty() {
            builder = builder.tls_built_in_root_certs(false);
            for cert in roots {
                builder = builder.add_root_certificate(cert);
            }
            tracing::debug!(
                count = config.certificate_authorities.len(),
                "Loaded custom certificate authorities"
            );
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Init(e.to_string()))?;

        let remote_url = &config.remote_url;
        let base_url = format!("{remote_url}/v1");

        Ok(Self {
            client,
            config,
            base_url,
            timeout: settings.timeout,
        })
    }

    /// Configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL all operation paths are relative to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request timeout in effect.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Query the control plane for its version.
    ///
    /// The response status is not checked: a non-success response yields an
    /// empty [`Version`].
    ///
    /// # Errors
    ///
    /// Returns error on network failure or an undecodable success body.
    pub async fn version(&self) -> Result<Version, ClientError> {
        let url = self.url("/version");
        tracing::debug!(url, "GET version");

        let (status, body) = execute(self.client.get(&url)).await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Version request was not successful");
        }

        decode(status, &body)
    }

    /// Apply resources and return the per-resource results in server order.
    ///
    /// # Errors
    ///
    /// Returns error if the payload cannot be encoded, on network failure, or
    /// if the API responds with a status above 399.
    pub async fn apply(&self, resources: &[Resource]) -> Result<Vec<ResourceStatus>, ClientError> {
        let payload = ApplyPayload { resources };
        let data = serde_json::to_vec(&payload).map_err(|e| ClientError::Serialize(e.to_string()))?;

        let url = self.url("/apply");
        tracing::debug!(url, count = resources.len(), "POST apply");

        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(data);

        let (status, body) = execute(request).await?;
        check_status(status, &body)?;

        let response: ApplyResponse = decode(status, &body)?;
        Ok(response.updates)
    }

    /// Fetch a configuration by name.
    ///
    /// # Errors
    ///
    /// Returns error on network failure or if the API responds with a status
    /// above 399.
    pub async fn configuration(&self, name: &str) -> Result<Configuration, ClientError> {
        self.fetch_configuration(name)
            .await
            .map(|response| response.configuration)
    }

    /// Fetch the raw text of a configuration by name.
    ///
    /// # Errors
    ///
    /// Returns error on network failure or if the API responds with a status
    /// above 399.
    pub async fn raw_configuration(&self, name: &str) -> Result<String, ClientError> {
        self.fetch_configuration(name).await.map(|response| response.raw)
    }

    async fn fetch_configuration(&self, name: &str) -> Result<ConfigurationResponse, ClientError> {
        let url = self.url(&format!("/configurations/{name}"));
        tracing::debug!(name, url, "GET configuration");

        let (status, body) = execute(self.client.get(&url)).await?;
        check_status(status, &body)?;

        decode(status, &body)
    }

    /// Start a rollout of the named configuration with default options.
    ///
    /// # Errors
    ///
    /// Returns error on network failure or if the API responds with a status
    /// above 399.
    pub async fn start_rollout(&self, name: &str) -> Result<(), ClientError> {
        let url = self.url(&format!("/rollouts/{name}/start"));
        tracing::debug!(name, url, "POST start rollout");

        let request = self.client.post(&url).json(&StartRolloutPayload::default());

        let (status, body) = execute(request).await?;
        check_status(status, &body)
    }

    /// Read the current rollout state of the named configuration.
    ///
    /// # Errors
    ///
    /// Returns error on network failure or if the API responds with a status
    /// above 399.
    pub async fn rollout_status(&self, name: &str) -> Result<Configuration, ClientError> {
        let url = self.url(&format!("/rollouts/{name}/status"));
        tracing::debug!(name, url, "GET rollout status");

        let (status, body) = execute(self.client.get(&url)).await?;
        check_status(status, &body)?;

        let response: ConfigurationResponse = decode(status, &body)?;
        Ok(response.configuration)
    }
}

/// Build the default headers carrying credentials.
fn auth_headers(config: &ClientConfig) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();

    let credentials = STANDARD.encode(format!(
        "{}:{}",
        config.auth.username, config.auth.password
    ));
    let mut basic = HeaderValue::from_str(&format!("Basic {credentials}"))
        .map_err(|e| ClientError::Init(format!("invalid basic auth header: {e}")))?;
    basic.set_sensitive(true);
    headers.insert(AUTHORIZATION, basic);

    if !config.auth.api_key.is_empty() {
        let mut key = HeaderValue::from_str(&config.auth.api_key)
            .map_err(|e| ClientError::Init(format!("invalid API key header: {e}")))?;
        key.set_sensitive(true);
        headers.insert(KEY_HEADER, key);
    }

    Ok(headers)
}

/// Parse every PEM entry into root certificates.
///
/// Each entry must hold at least one certificate, and every certificate must
/// be accepted as a trust anchor.
fn parse_certificate_authorities(pems: &[String]) -> Result<Vec<reqwest::Certificate>, ClientError> {
    let mut store = RootCertStore::empty();
    let mut roots = Vec::new();
    for pem in pems {
        let ders = rustls_pemfile::certs(&mut pem.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ClientError::CertificateAuthority)?;
        if ders.is_empty() {
            return Err(ClientError::CertificateAuthority);
        }
        for der in ders {
            let cert = reqwest::Certificate::from_der(der.as_ref())
                .map_err(|_| ClientError::CertificateAuthority)?;
            store
                .add(der)
                .map_err(|_| ClientError::CertificateAuthority)?;
            roots.push(cert);
        }
    }
    Ok(roots)
}

/// Send a request and read the full response body.
async fn execute(request: RequestBuilder) -> Result<(StatusCode, String), ClientError> {
    let response = request
        .send()
        .await
        .map_err(|e| ClientError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::Request(e.to_string()))?;

    Ok((status, body))
}

fn check_status(status: StatusCode, body: &str) -> Result<(), ClientError> {
    if status.as_u16() > 399 {
        return Err(ClientError::Api {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }
    Ok(())
}

/// Decode a JSON body.
///
/// Only 2xx bodies are decoded. Any other status, or an empty body, yields
/// the default value.
fn decode<T: DeserializeOwned + Default>(status: StatusCode, body: &str) -> Result<T, ClientError> {
    if !status.is_success() || body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(body).map_err(|e| ClientError::Parse(e.to_string()))
}

/// Errors that can occur with the BindPlane client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// A configured certificate authority is not valid PEM
    #[error("failed to append certificate authority")]
    CertificateAuthority,
    /// Client initialization failed
    #[error("client init error: {0}")]
    Init(String),
    /// A construction option failed
    #[error("apply option: {0}")]
    Option(String),
    /// Request payload could not be encoded
    #[error("serialize request: {0}")]
    Serialize(String),
    /// HTTP request failed
    #[error("request error: {0}")]
    Request(String),
    /// API returned a status above 399
    #[error("BindPlane API returned status {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },
    /// Response parsing failed
    #[error("parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// HTTP status of an API error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the API rejected the request (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// Whether the API failed to handle the request (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }
}
