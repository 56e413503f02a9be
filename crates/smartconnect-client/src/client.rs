//! Session-holding SmartAPI client.

use serde::Serialize;
use serde::de::DeserializeOwned;
use smartconnect_types::{
    Credentials, Envelope, Profile, Result, Session, SmartConnectError, TokenSet,
};
use std::path::PathBuf;

use crate::cache::TokenCache;
use crate::endpoint::{self, Endpoint};
use crate::transport::{ApiRequest, ClientConfig, HttpTransport, Transport};

/// Options for establishing a session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Client code, if known ahead of login.
    pub client_code: Option<String>,
    /// Trading-scope API key.
    pub trade_key: Option<String>,
    /// History-scope API key.
    pub history_key: Option<String>,
    /// Token cache file; caching is disabled when `None`.
    pub cache_path: Option<PathBuf>,
    /// Password login credentials, used when no cached session is usable.
    pub credentials: Option<Credentials>,
}

impl SessionOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the trading-scope API key.
    #[must_use]
    pub fn with_trade_key(mut self, key: impl Into<String>) -> Self {
        self.trade_key = Some(key.into());
        self
    }

    /// Sets the history-scope API key.
    #[must_use]
    pub fn with_history_key(mut self, key: impl Into<String>) -> Self {
        self.history_key = Some(key.into());
        self
    }

    /// Enables the token cache at the given path.
    #[must_use]
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Sets the login credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the client code.
    #[must_use]
    pub fn with_client_code(mut self, client_code: impl Into<String>) -> Self {
        self.client_code = Some(client_code.into());
        self
    }
}

/// SmartAPI client bound to one session.
///
/// Operations that replace tokens take `&mut self`, so a client cannot
/// refresh while another call is reading its tokens.
#[derive(Debug)]
pub struct SmartClient<T = HttpTransport> {
    transport: T,
    session: Session,
    cache: Option<TokenCache>,
    credentials: Option<Credentials>,
    probed_profile: Option<Profile>,
}

impl SmartClient<HttpTransport> {
    /// Builds an HTTP transport and establishes a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be built or no session could
    /// be established (see [`SmartClient::initialize`]).
    pub async fn connect(config: ClientConfig, options: SessionOptions) -> Result<Self> {
        let transport = HttpTransport::new(config).await?;
        Self::initialize(transport, options).await
    }
}

impl<T: Transport> SmartClient<T> {
    /// Creates a client without contacting the server.
    ///
    /// The session starts empty; call [`SmartClient::bootstrap`] or
    /// [`SmartClient::authenticate`] before using secured endpoints.
    #[must_use]
    pub fn new(transport: T, options: SessionOptions) -> Self {
        let client_code = options
            .client_code
            .or_else(|| options.credentials.as_ref().map(|c| c.client_code.clone()))
            .unwrap_or_default();

        let session = Session {
            trade_key: options.trade_key,
            history_key: options.history_key,
            ..Session::new(client_code)
        };

        Self {
            transport,
            session,
            cache: options.cache_path.map(TokenCache::new),
            credentials: options.credentials,
            probed_profile: None,
        }
    }

    /// Creates a client and establishes a usable session.
    ///
    /// # Errors
    ///
    /// Returns [`SmartConnectError::Bootstrap`] if the cached session, the
    /// token refresh and the password login all fail, or the first
    /// non-recoverable error encountered on the way.
    pub async fn initialize(transport: T, options: SessionOptions) -> Result<Self> {
        let mut client = Self::new(transport, options);
        client.bootstrap().await?;
        Ok(client)
    }

    /// Establishes a session by falling back through three steps:
    ///
    /// 1. the cached tokens, probed with a profile request;
    /// 2. a token refresh using the current refresh token;
    /// 3. a password login with the configured credentials.
    ///
    /// Envelope, serialization and validation failures move on to the next
    /// step. Any other failure is returned immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SmartConnectError::Bootstrap`] carrying each step's error if
    /// all three fail.
    pub async fn bootstrap(&mut self) -> Result<()> {
        self.restore_cached();

        let profile = match self.profile().await {
            Ok(profile) => {
                tracing::info!(client_code = %profile.client_code, "cached session is valid");
                self.probed_profile = Some(profile);
                return Ok(());
            }
            Err(e) if e.is_recoverable() => e,
            Err(e) => return Err(e),
        };
        tracing::debug!(error = %profile, "profile probe failed, refreshing tokens");

        let refresh = match self.refresh().await {
            Ok(_) => {
                tracing::info!("session refreshed");
                return Ok(());
            }
            Err(e) if e.is_recoverable() => e,
            Err(e) => return Err(e),
        };
        tracing::debug!(error = %refresh, "token refresh failed, logging in");

        let credentials = self.credentials.clone();
        let authenticate = match credentials {
            Some(credentials) => match self.authenticate(&credentials).await {
                Ok(_) => {
                    tracing::info!(client_code = %self.session.client_code, "logged in");
                    return Ok(());
                }
                Err(e) if e.is_recoverable() => e,
                Err(e) => return Err(e),
            },
            None => SmartConnectError::MissingCredentials,
        };

        tracing::warn!(error = %authenticate, "could not establish a session");
        Err(SmartConnectError::Bootstrap {
            profile: Box::new(profile),
            refresh: Box::new(refresh),
            authenticate: Box::new(authenticate),
        })
    }

    /// Loads the cached snapshot into the session, ignoring failures.
    fn restore_cached(&mut self) {
        let Some(cache) = &self.cache else {
            return;
        };
        match cache.load() {
            Ok(cached) => {
                let cached_code = cached.client_code.clone();
                if self.session.merge_cached(cached) {
                    tracing::debug!(path = %cache.path().display(), "loaded cached session");
                } else {
                    tracing::debug!(
                        path = %cache.path().display(),
                        cached = %cached_code,
                        configured = %self.session.client_code,
                        "cached session belongs to another client code, ignoring"
                    );
                }
            }
            Err(e) => tracing::debug!(error = %e, "no usable token cache"),
        }
    }

    /// Logs in with a password and one-time code.
    ///
    /// On success the session tokens are replaced and, if caching is enabled,
    /// persisted. On failure the session is unchanged.
    ///
    /// # Errors
    ///
    /// Returns the envelope as [`SmartConnectError::Api`] if the login is
    /// rejected, or a [`SmartConnectError::Cache`] if the new tokens could not
    /// be persisted.
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<TokenSet> {
        let body = serde_json::to_string(credentials)?;
        let tokens: TokenSet = self
            .call(&endpoint::LOGIN_BY_PASSWORD, Some(body))
            .await?;

        self.session.client_code.clone_from(&credentials.client_code);
        self.session.apply_tokens(&tokens);
        self.probed_profile = None;
        self.persist()?;
        Ok(tokens)
    }

    /// Exchanges the current refresh token for a new token set.
    ///
    /// Same mutate-and-persist contract as [`SmartClient::authenticate`].
    ///
    /// # Errors
    ///
    /// Returns the envelope as [`SmartConnectError::Api`] if the refresh is
    /// rejected, or a [`SmartConnectError::Cache`] if the new tokens could not
    /// be persisted.
    pub async fn refresh(&mut self) -> Result<TokenSet> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct RefreshRequest<'a> {
            refresh_token: &'a str,
        }

        let body = serde_json::to_string(&RefreshRequest {
            refresh_token: &self.session.refresh_token,
        })?;
        let tokens: TokenSet = self.call(&endpoint::GENERATE_TOKENS, Some(body)).await?;

        self.session.apply_tokens(&tokens);
        self.persist()?;
        Ok(tokens)
    }

    /// Fetches the account profile.
    ///
    /// # Errors
    ///
    /// Returns the envelope as [`SmartConnectError::Api`] if the session is not
    /// valid.
    pub async fn profile(&self) -> Result<Profile> {
        self.call(&endpoint::PROFILE, None).await
    }

    /// Returns the profile fetched while [`SmartClient::bootstrap`] probed the
    /// cached session, if that step succeeded.
    #[must_use]
    pub const fn probed_profile(&self) -> Option<&Profile> {
        self.probed_profile.as_ref()
    }

    /// Returns the current session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the token cache, if caching is enabled.
    #[must_use]
    pub const fn cache(&self) -> Option<&TokenCache> {
        self.cache.as_ref()
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Writes the session to the cache, if one is configured.
    fn persist(&self) -> Result<()> {
        if let Some(cache) = &self.cache {
            cache.store(&self.session)?;
        }
        Ok(())
    }

    /// Sends one request and unwraps the response envelope.
    pub(crate) async fn call<D>(&self, endpoint: &Endpoint, body: Option<String>) -> Result<D>
    where
        D: DeserializeOwned + Default,
    {
        let request = ApiRequest {
            endpoint: *endpoint,
            api_key: self.session.key(endpoint.scope).to_string(),
            access_token: self.session.access_token.clone(),
            body,
        };

        let raw = self.transport.execute(request).await?;
        let envelope: Envelope = serde_json::from_str(&raw)?;
        if let Some(err) = envelope.error() {
            tracing::debug!(path = endpoint.path, error = %err, "request rejected");
        }
        envelope.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockTransport, failure, login_success, profile_success};
    use tempfile::TempDir;

    fn options() -> SessionOptions {
        SessionOptions::new()
            .with_trade_key("trade-key")
            .with_history_key("history-key")
            .with_credentials(Credentials::new("A123", "1234", "654321"))
    }

    #[tokio::test]
    async fn test_bootstrap_stops_at_valid_profile() {
        let mock = MockTransport::new();
        mock.respond(&endpoint::PROFILE, profile_success("A123"));

        let client = SmartClient::initialize(mock.clone(), options()).await.unwrap();

        assert_eq!(mock.calls(&endpoint::PROFILE), 1);
        assert_eq!(mock.calls(&endpoint::GENERATE_TOKENS), 0);
        assert_eq!(mock.calls(&endpoint::LOGIN_BY_PASSWORD), 0);
        assert_eq!(client.session().client_code, "A123");
        assert_eq!(client.probed_profile().unwrap().client_code, "A123");
    }

    #[tokio::test]
    async fn test_bootstrap_refresh_skips_login() {
        let mock = MockTransport::new();
        mock.respond(&endpoint::PROFILE, failure("Invalid Token", "AG8001"));
        mock.respond(
            &endpoint::GENERATE_TOKENS,
            login_success("jwt-2", "refresh-2", "feed-2"),
        );

        let client = SmartClient::initialize(mock.clone(), options()).await.unwrap();

        assert_eq!(mock.calls(&endpoint::GENERATE_TOKENS), 1);
        assert_eq!(mock.calls(&endpoint::LOGIN_BY_PASSWORD), 0);
        let session = client.session();
        assert_eq!(session.access_token, "jwt-2");
        assert_eq!(session.refresh_token, "refresh-2");
        assert_eq!(session.feed_token, "feed-2");
    }

    #[tokio::test]
    async fn test_bootstrap_falls_back_to_login() {
        let mock = MockTransport::new();
        mock.respond(&endpoint::PROFILE, failure("Invalid Token", "AG8001"));
        mock.respond(&endpoint::GENERATE_TOKENS, failure("Invalid Token", "AG8002"));
        mock.respond(
            &endpoint::LOGIN_BY_PASSWORD,
            login_success("jwt", "refresh", "feed"),
        );

        let client = SmartClient::initialize(mock.clone(), options()).await.unwrap();

        assert_eq!(mock.calls(&endpoint::LOGIN_BY_PASSWORD), 1);
        assert!(client.session().is_authenticated());
        assert!(client.probed_profile().is_none());

        let login = mock.last_request(&endpoint::LOGIN_BY_PASSWORD).unwrap();
        assert_eq!(login.api_key, "trade-key");
        let body: serde_json::Value = serde_json::from_str(&login.body.unwrap()).unwrap();
        assert_eq!(body["clientcode"], "A123");
        assert_eq!(body["totp"], "654321");
    }

    #[tokio::test]
    async fn test_bootstrap_all_steps_fail() {
        let mock = MockTransport::new();
        mock.respond(&endpoint::PROFILE, failure("Invalid Token", "AG8001"));
        mock.respond(&endpoint::GENERATE_TOKENS, failure("Invalid Token", "AG8002"));
        mock.respond(&endpoint::LOGIN_BY_PASSWORD, failure("Invalid totp", "AB1050"));

        let result = SmartClient::initialize(mock.clone(), options()).await;

        match result {
            Err(SmartConnectError::Bootstrap {
                profile,
                refresh,
                authenticate,
            }) => {
                assert_eq!(profile.api_error_code(), Some("AG8001"));
                assert_eq!(refresh.api_error_code(), Some("AG8002"));
                assert_eq!(authenticate.api_error_code(), Some("AB1050"));
            }
            other => panic!("expected bootstrap failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bootstrap_without_credentials() {
        let mock = MockTransport::new();
        mock.respond(&endpoint::PROFILE, failure("Invalid Token", "AG8001"));
        mock.respond(&endpoint::GENERATE_TOKENS, failure("Invalid Token", "AG8002"));

        let result =
            SmartClient::initialize(mock.clone(), SessionOptions::new().with_trade_key("k")).await;

        assert!(matches!(
            result,
            Err(SmartConnectError::Bootstrap { ref authenticate, .. })
                if matches!(**authenticate, SmartConnectError::MissingCredentials)
        ));
        assert_eq!(mock.calls(&endpoint::LOGIN_BY_PASSWORD), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_propagates_transport_errors() {
        let mock = MockTransport::new();
        mock.fail(&endpoint::PROFILE, "connection refused");

        let result = SmartClient::initialize(mock.clone(), options()).await;

        assert!(matches!(result, Err(SmartConnectError::Http(_))));
        assert_eq!(mock.calls(&endpoint::GENERATE_TOKENS), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_treats_garbage_as_recoverable() {
        let mock = MockTransport::new();
        mock.respond(&endpoint::PROFILE, "<html>Unauthorized</html>");
        mock.respond(
            &endpoint::GENERATE_TOKENS,
            login_success("jwt", "refresh", "feed"),
        );

        let client = SmartClient::initialize(mock.clone(), options()).await.unwrap();
        assert_eq!(client.session().access_token, "jwt");
    }

    #[tokio::test]
    async fn test_login_persists_and_reloads() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        let mock = MockTransport::new();
        mock.respond(
            &endpoint::LOGIN_BY_PASSWORD,
            login_success("jwt", "refresh", "feed"),
        );

        let mut client = SmartClient::new(mock.clone(), options().with_cache_path(&path));
        let tokens = client
            .authenticate(&Credentials::new("A123", "1234", "654321"))
            .await
            .unwrap();

        assert_eq!(client.session().access_token, tokens.jwt_token);
        assert_eq!(client.session().refresh_token, tokens.refresh_token);
        assert_eq!(client.session().feed_token, tokens.feed_token);

        let reloaded = TokenCache::new(&path).load().unwrap();
        assert_eq!(&reloaded, client.session());
    }

    #[tokio::test]
    async fn test_bootstrap_uses_cached_tokens() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        let mut cached = Session::new("A123");
        cached.apply_tokens(&TokenSet {
            jwt_token: "cached-jwt".into(),
            refresh_token: "cached-refresh".into(),
            feed_token: "cached-feed".into(),
            state: None,
        });
        TokenCache::new(&path).store(&cached).unwrap();

        let mock = MockTransport::new();
        mock.respond(&endpoint::PROFILE, profile_success("A123"));

        let client = SmartClient::initialize(mock.clone(), options().with_cache_path(&path))
            .await
            .unwrap();

        let probe = mock.last_request(&endpoint::PROFILE).unwrap();
        assert_eq!(probe.access_token, "cached-jwt");
        assert_eq!(probe.body, None);
        assert_eq!(client.session().trade_key.as_deref(), Some("trade-key"));
    }

    #[tokio::test]
    async fn test_bootstrap_ignores_cache_of_other_account() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        let mut cached = Session::new("A123");
        cached.apply_tokens(&TokenSet {
            jwt_token: "A-jwt".into(),
            refresh_token: "A-refresh".into(),
            feed_token: "A-feed".into(),
            state: None,
        });
        TokenCache::new(&path).store(&cached).unwrap();

        let mock = MockTransport::new();
        mock.respond(&endpoint::PROFILE, failure("Invalid Token", "AG8001"));
        mock.respond(&endpoint::GENERATE_TOKENS, failure("Invalid Token", "AG8001"));
        mock.respond(
            &endpoint::LOGIN_BY_PASSWORD,
            login_success("B-jwt", "B-refresh", "B-feed"),
        );

        let options = SessionOptions::new()
            .with_trade_key("trade-key")
            .with_client_code("B999")
            .with_credentials(Credentials::new("B999", "1234", "654321"))
            .with_cache_path(&path);
        let client = SmartClient::initialize(mock.clone(), options).await.unwrap();

        let probe = mock.last_request(&endpoint::PROFILE).unwrap();
        assert_eq!(probe.access_token, "");
        let refresh = mock.last_request(&endpoint::GENERATE_TOKENS).unwrap();
        assert!(!refresh.body.unwrap().contains("A-refresh"));
        assert_eq!(mock.calls(&endpoint::LOGIN_BY_PASSWORD), 1);
        assert_eq!(client.session().client_code, "B999");
        assert_eq!(client.session().access_token, "B-jwt");

        let stored = TokenCache::new(&path).load().unwrap();
        assert_eq!(stored.client_code, "B999");
        assert_eq!(stored.refresh_token, "B-refresh");
    }

    #[tokio::test]
    async fn test_refresh_sends_current_token() {
        let mock = MockTransport::new();
        mock.respond(
            &endpoint::LOGIN_BY_PASSWORD,
            login_success("jwt", "refresh-1", "feed"),
        );
        mock.respond(
            &endpoint::GENERATE_TOKENS,
            login_success("jwt-2", "refresh-2", "feed-2"),
        );

        let mut client = SmartClient::new(mock.clone(), options());
        client
            .authenticate(&Credentials::new("A123", "1234", "654321"))
            .await
            .unwrap();
        client.refresh().await.unwrap();

        let request = mock.last_request(&endpoint::GENERATE_TOKENS).unwrap();
        let body: serde_json::Value = serde_json::from_str(&request.body.unwrap()).unwrap();
        assert_eq!(body["refreshToken"], "refresh-1");
        assert_eq!(request.access_token, "jwt");
        assert_eq!(client.session().refresh_token, "refresh-2");
    }

    #[tokio::test]
    async fn test_failed_login_leaves_session_untouched() {
        let mock = MockTransport::new();
        mock.respond(&endpoint::LOGIN_BY_PASSWORD, failure("Invalid totp", "AB1050"));

        let mut client = SmartClient::new(mock.clone(), options());
        let before = client.session().clone();
        let result = client
            .authenticate(&Credentials::new("A123", "1234", "000000"))
            .await;

        assert!(matches!(result, Err(SmartConnectError::Api(_))));
        assert_eq!(client.session(), &before);
    }

    #[tokio::test]
    async fn test_cache_write_failure_is_surfaced() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the cache file should be makes the write fail.
        let path = temp_dir.path().join("session.json");
        std::fs::create_dir(&path).unwrap();

        let mock = MockTransport::new();
        mock.respond(&endpoint::PROFILE, failure("Invalid Token", "AG8001"));
        mock.respond(
            &endpoint::GENERATE_TOKENS,
            login_success("jwt", "refresh", "feed"),
        );

        let result = SmartClient::initialize(mock.clone(), options().with_cache_path(&path)).await;

        assert!(matches!(result, Err(SmartConnectError::Cache(_))));
        assert_eq!(mock.calls(&endpoint::LOGIN_BY_PASSWORD), 0);
    }
}
