//! SmartAPI endpoint table.

use smartconnect_types::KeyScope;

/// Production REST base URL.
pub const BASE_URL: &str = "https://apiconnect.angelone.in/rest";

/// HTTP method used by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`, sent without a body.
    Get,
    /// `POST` with a JSON body.
    Post,
}

impl Method {
    /// Returns the method name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A fixed SmartAPI route together with the key scope that signs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// HTTP method.
    pub method: Method,
    /// Path below the base URL, starting with `/`.
    pub path: &'static str,
    /// Which API key goes into `X-PrivateKey`.
    pub scope: KeyScope,
}

impl Endpoint {
    /// Builds the full URL for this endpoint.
    ///
    /// # Example
    ///
    /// ```
    /// use smartconnect_client::endpoint::{BASE_URL, PROFILE};
    ///
    /// assert_eq!(
    ///     PROFILE.url(BASE_URL),
    ///     "https://apiconnect.angelone.in/rest/secure/angelbroking/user/v1/getProfile"
    /// );
    /// ```
    #[must_use]
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path)
    }
}

/// Password + TOTP login.
pub const LOGIN_BY_PASSWORD: Endpoint = Endpoint {
    method: Method::Post,
    path: "/auth/angelbroking/user/v1/loginByPassword",
    scope: KeyScope::Trading,
};

/// Exchange a refresh token for a new token set.
pub const GENERATE_TOKENS: Endpoint = Endpoint {
    method: Method::Post,
    path: "/auth/angelbroking/jwt/v1/generateTokens",
    scope: KeyScope::Trading,
};

/// Account profile.
pub const PROFILE: Endpoint = Endpoint {
    method: Method::Get,
    path: "/secure/angelbroking/user/v1/getProfile",
    scope: KeyScope::Trading,
};

/// Historical candles.
pub const CANDLE_DATA: Endpoint = Endpoint {
    method: Method::Post,
    path: "/secure/angelbroking/historical/v1/getCandleData",
    scope: KeyScope::History,
};
