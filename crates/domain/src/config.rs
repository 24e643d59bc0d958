//! Client configuration

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_LEGACY_URL, DEFAULT_OAUTH_URL, DEFAULT_TIMEOUT_SECS,
    DEFAULT_UPLOAD_URL,
};

/// Settings consumed by the execution engine.
///
/// Every field has a default, so a configuration file only needs to name the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the versioned REST API
    pub base_url: String,
    /// Base URL for content uploads
    pub upload_url: String,
    /// Base URL of the OAuth2 authorize/token/revoke endpoints
    pub oauth_url: String,
    /// Base URL of the legacy ticket-auth action endpoint
    pub legacy_url: String,
    /// Per-request network timeout
    pub timeout_secs: u64,
    /// Retry once, after a short backoff, when no usable response arrives
    pub retry_on_server_error: bool,
    /// Optional web proxy (e.g. `http://proxy.local:3128`)
    pub proxy: Option<String>,
    /// Optional User-Agent override
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            oauth_url: DEFAULT_OAUTH_URL.to_string(),
            legacy_url: DEFAULT_LEGACY_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_on_server_error: true,
            proxy: None,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Point every surface at one server, as tests against a mock server do.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            upload_url: base_url.clone(),
            oauth_url: format!("{base_url}/oauth2"),
            legacy_url: base_url.clone(),
            base_url,
            ..Self::default()
        }
    }
}
