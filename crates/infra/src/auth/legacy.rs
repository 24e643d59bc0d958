//! Legacy `BoxAuth` signing (API key + per-user auth token)

use boxapi_domain::constants::{AUTHORIZATION_HEADER, LEGACY_AUTH_SCHEME};
use parking_lot::RwLock;
use reqwest::header::HeaderMap;

use super::{insert_header, insert_on_behalf_of, AuthScope, Authenticator};

/// Signs requests with
/// `Authorization: BoxAuth api_key=<k>&auth_token=<t>&shared_link=<l>`.
///
/// Empty fields are omitted entirely, so the header never carries a dangling
/// `&` or an empty `key=`.
pub struct LegacyAuthenticator {
    api_key: String,
    auth_token: RwLock<Option<String>>,
}

impl LegacyAuthenticator {
    /// Authenticator holding only the application key, as used before the
    /// ticket flow has produced a user token.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), auth_token: RwLock::new(None) }
    }

    pub fn with_auth_token(api_key: impl Into<String>, auth_token: impl Into<String>) -> Self {
        let authenticator = Self::new(api_key);
        authenticator.replace_auth_token(auth_token);
        authenticator
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Swap the user token, e.g. once `get_auth_token` has returned.
    pub fn replace_auth_token(&self, auth_token: impl Into<String>) {
        let token = auth_token.into();
        *self.auth_token.write() = if token.is_empty() { None } else { Some(token) };
    }

    #[must_use]
    pub fn has_auth_token(&self) -> bool {
        self.auth_token.read().is_some()
    }

    /// The `Authorization` header value for `scope`.
    #[must_use]
    pub fn header_value(&self, scope: &AuthScope) -> String {
        let auth_token = self.auth_token.read();
        let fields = [
            ("api_key", Some(self.api_key.as_str())),
            ("auth_token", auth_token.as_deref()),
            ("shared_link", scope.shared_link()),
        ];

        let params = fields
            .iter()
            .filter_map(|(name, value)| match value {
                Some(v) if !v.is_empty() => Some(format!("{name}={v}")),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("&");

        format!("{LEGACY_AUTH_SCHEME} {params}")
    }
}

impl Authenticator for LegacyAuthenticator {
    fn sign(&self, scope: &AuthScope) -> HeaderMap {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, AUTHORIZATION_HEADER, &self.header_value(scope));
        insert_on_behalf_of(&mut headers, scope);
        headers
    }

    fn scheme(&self) -> &'static str {
        "legacy"
    }
}

impl std::fmt::Debug for LegacyAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyAuthenticator")
            .field("api_key", &"<redacted>")
            .field("has_auth_token", &self.has_auth_token())
            .finish()
    }
}
