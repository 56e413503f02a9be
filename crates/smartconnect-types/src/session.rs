//! Session record and login payloads.

use serde::{Deserialize, Serialize};

/// API key scope. SmartAPI issues separate keys for trading and for
/// historical data, and each endpoint expects one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyScope {
    /// Trading key (login, token refresh, profile, orders).
    Trading,
    /// Historical data key.
    History,
}

/// Authenticated session state.
///
/// This is the record persisted by the token cache. The tokens are either all
/// empty (not logged in) or all set; a malformed refresh response can leave
/// them partially set until the next successful login.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Client code (user identifier).
    pub client_code: String,
    /// Trading-scope API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_key: Option<String>,
    /// History-scope API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_key: Option<String>,
    /// JWT access token sent as the bearer token.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_token: String,
    /// Token used to obtain a fresh access token.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,
    /// Token for the market data feed.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub feed_token: String,
}

impl Session {
    /// Creates an unauthenticated session for the given client code.
    #[must_use]
    pub fn new(client_code: impl Into<String>) -> Self {
        Self {
            client_code: client_code.into(),
            ..Self::default()
        }
    }

    /// Returns the API key for the given scope, or an empty string if unset.
    #[must_use]
    pub fn key(&self, scope: KeyScope) -> &str {
        match scope {
            KeyScope::Trading => self.trade_key.as_deref(),
            KeyScope::History => self.history_key.as_deref(),
        }
        .unwrap_or_default()
    }

    /// Returns true if all three tokens are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty()
            && !self.refresh_token.is_empty()
            && !self.feed_token.is_empty()
    }

    /// Replaces the tokens with a freshly issued set.
    pub fn apply_tokens(&mut self, tokens: &TokenSet) {
        self.access_token.clone_from(&tokens.jwt_token);
        self.refresh_token.clone_from(&tokens.refresh_token);
        self.feed_token.clone_from(&tokens.feed_token);
    }

    /// Adopts tokens from a cached snapshot.
    ///
    /// Keys and client code already configured on `self` take precedence;
    /// cached values only fill the gaps. A snapshot belonging to a different
    /// client code is ignored entirely and `false` is returned.
    pub fn merge_cached(&mut self, cached: Self) -> bool {
        if !self.client_code.is_empty()
            && !cached.client_code.is_empty()
            && self.client_code != cached.client_code
        {
            return false;
        }
        if self.client_code.is_empty() {
            self.client_code = cached.client_code;
        }
        if self.trade_key.is_none() {
            self.trade_key = cached.trade_key;
        }
        if self.history_key.is_none() {
            self.history_key = cached.history_key;
        }
        self.access_token = cached.access_token;
        self.refresh_token = cached.refresh_token;
        self.feed_token = cached.feed_token;
        true
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("client_code", &self.client_code)
            .field("trade_key", &self.trade_key.as_ref().map(|_| "<redacted>"))
            .field("history_key", &self.history_key.as_ref().map(|_| "<redacted>"))
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

/// Password login request.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Client code.
    #[serde(rename = "clientcode")]
    pub client_code: String,
    /// Account PIN or password.
    pub password: String,
    /// Current one-time code from the authenticator app.
    pub totp: String,
    /// Opaque state echoed back by the server.
    #[serde(default)]
    pub state: String,
}

impl Credentials {
    /// Creates login credentials.
    #[must_use]
    pub fn new(
        client_code: impl Into<String>,
        password: impl Into<String>,
        totp: impl Into<String>,
    ) -> Self {
        Self {
            client_code: client_code.into(),
            password: password.into(),
            totp: totp.into(),
            state: String::new(),
        }
    }

    /// Sets the opaque state value.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_code", &self.client_code)
            .field("password", &"<redacted>")
            .field("totp", &"<redacted>")
            .field("state", &self.state)
            .finish()
    }
}

/// Tokens issued by login or refresh.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    /// Access token.
    #[serde(default)]
    pub jwt_token: String,
    /// Refresh token.
    #[serde(default)]
    pub refresh_token: String,
    /// Feed token.
    #[serde(default)]
    pub feed_token: String,
    /// State echoed from the login request (login only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("jwt_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("feed_token", &"<redacted>")
            .field("state", &self.state)
            .finish()
    }
}

/// Account profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Client code.
    #[serde(rename = "clientcode", default)]
    pub client_code: String,
    /// Account holder name.
    #[serde(default)]
    pub name: String,
    /// Registered email.
    #[serde(default)]
    pub email: String,
    /// Registered mobile number.
    #[serde(rename = "mobileno", default)]
    pub mobile_no: String,
    /// Exchanges the account may trade on.
    #[serde(default)]
    pub exchanges: Vec<String>,
    /// Enabled product types.
    #[serde(default)]
    pub products: Vec<String>,
    /// Last login time as reported by the server.
    #[serde(rename = "lastlogintime", default)]
    pub last_login_time: String,
    /// Broker identifier.
    #[serde(rename = "brokerid", default)]
    pub broker_id: String,
}
