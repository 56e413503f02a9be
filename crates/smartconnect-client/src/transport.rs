//! HTTP transport for SmartAPI requests.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use smartconnect_types::{Result, SmartConnectError};
use std::time::Duration;

use crate::endpoint::{BASE_URL, Endpoint, Method};
use crate::identity::NetworkIdentity;

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST base URL.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("smartconnect/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// A single request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Target endpoint.
    pub endpoint: Endpoint,
    /// Value for `X-PrivateKey`.
    pub api_key: String,
    /// Bearer token, possibly empty.
    pub access_token: String,
    /// Serialized JSON body; `None` for `GET`.
    pub body: Option<String>,
}

/// Sends an [`ApiRequest`] and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes one request.
    ///
    /// # Errors
    ///
    /// Returns [`SmartConnectError::Http`] on network failure.
    async fn execute(&self, request: ApiRequest) -> Result<String>;
}

/// reqwest-backed transport that attaches the broker-mandated headers.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
    identity: NetworkIdentity,
}

impl HttpTransport {
    /// Creates a transport, discovering the host's network identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the identity
    /// cannot be resolved.
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let client = build_client(&config)?;
        let identity = NetworkIdentity::discover(&client).await?;
        Ok(Self {
            client,
            config,
            identity,
        })
    }

    /// Creates a transport with an explicitly supplied identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_identity(config: ClientConfig, identity: NetworkIdentity) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self {
            client,
            config,
            identity,
        })
    }

    /// Returns the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the identity reported in request headers.
    #[must_use]
    pub const fn identity(&self) -> &NetworkIdentity {
        &self.identity
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<String> {
        let url = request.endpoint.url(&self.config.base_url);
        let headers = api_headers(&self.identity, &request.api_key, &request.access_token)?;

        let builder = match request.endpoint.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url).body(request.body.unwrap_or_default()),
        };

        tracing::debug!(method = request.endpoint.method.as_str(), %url, "sending request");

        let response = builder
            .headers(headers)
            .send()
            .await
            .map_err(|e| SmartConnectError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SmartConnectError::Http(e.to_string()))?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), %url, "received response");

        Ok(body)
    }
}

fn build_client(config: &ClientConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(&config.user_agent)
        .gzip(true)
        .build()
        .map_err(|e| SmartConnectError::Http(e.to_string()))
}

/// Builds the header set every SmartAPI request carries.
///
/// # Errors
///
/// Returns [`SmartConnectError::Http`] if a value contains characters not
/// allowed in an HTTP header.
pub fn api_headers(
    identity: &NetworkIdentity,
    api_key: &str,
    access_token: &str,
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("x-clientlocalip"),
        header_value(&identity.local_ip)?,
    );
    headers.insert(
        HeaderName::from_static("x-clientpublicip"),
        header_value(&identity.public_ip)?,
    );
    headers.insert(
        HeaderName::from_static("x-macaddress"),
        header_value(&identity.mac_address)?,
    );
    headers.insert(HeaderName::from_static("x-privatekey"), header_value(api_key)?);
    headers.insert(HeaderName::from_static("x-usertype"), HeaderValue::from_static("USER"));
    headers.insert(HeaderName::from_static("x-sourceid"), HeaderValue::from_static("WEB"));

    let mut bearer = header_value(&format!("Bearer {access_token}"))?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);

    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| SmartConnectError::Http(format!("invalid header value: {e}")))
}
