//! Token and ticket payloads exchanged with the token-acquisition endpoints

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth2 access and refresh tokens with expiry metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Bearer token presented on every API call
    pub access_token: String,

    /// Refresh token; single use, replaced on every refresh
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type (always "bearer" for this service)
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Absolute expiration timestamp, computed from `expires_in` on receipt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    /// Create a new `TokenSet`, computing `expires_at` from `expires_in`.
    ///
    /// A lifetime that does not fit in a timestamp is treated as no expiry.
    #[must_use]
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        let expires_at = if expires_in > 0 { offset_from_now(expires_in) } else { None };

        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_in,
            expires_at,
        }
    }

    /// Whether the access token is expired or expires within
    /// `threshold_seconds`. Tokens without an expiry never expire.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => match offset_from_now(threshold_seconds) {
                Some(deadline) => deadline >= expires_at,
                None => threshold_seconds > 0,
            },
            None => false,
        }
    }
}

fn offset_from_now(seconds: i64) -> Option<DateTime<Utc>> {
    chrono::Duration::try_seconds(seconds).and_then(|delta| Utc::now().checked_add_signed(delta))
}

/// Application credentials for the OAuth2 endpoints.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    /// Must match a redirect URI registered for the application, when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

impl OAuthCredentials {
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into(), redirect_uri: None }
    }

    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Token response body of `POST /oauth2/token`
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        let mut tokens = Self::new(response.access_token, response.refresh_token, response.expires_in);
        tokens.token_type = response.token_type;
        tokens
    }
}

/// Error body of the OAuth2 endpoints (RFC 6749 §5.2)
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthErrorBody {
    pub error: String,
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

/// Response of the legacy `get_ticket` action
#[derive(Debug, Clone, Deserialize)]
pub struct TicketResponse {
    pub status: String,
    #[serde(default)]
    pub ticket: Option<String>,
}

/// Response of the legacy `get_auth_token` action
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokenResponse {
    pub status: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Account the token was issued for, passed through untouched
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}
