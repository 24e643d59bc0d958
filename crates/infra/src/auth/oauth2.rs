//! OAuth2 bearer signing

use boxapi_domain::constants::{AUTHORIZATION_HEADER, BEARER_AUTH_SCHEME, SHARED_LINK_HEADER};
use parking_lot::RwLock;
use reqwest::header::HeaderMap;

use super::{insert_header, insert_on_behalf_of, AuthScope, Authenticator};

/// Signs requests with `Authorization: Bearer <token>`.
///
/// A shared link travels in its own `BoxApi: shared_link=<link>` header and
/// is never merged into `Authorization`. The access token can be swapped in
/// place after a refresh; requests already signed keep the old token.
pub struct OAuth2Authenticator {
    access_token: RwLock<String>,
}

impl OAuth2Authenticator {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self { access_token: RwLock::new(access_token.into()) }
    }

    pub fn replace_access_token(&self, access_token: impl Into<String>) {
        *self.access_token.write() = access_token.into();
    }

    #[must_use]
    pub fn access_token(&self) -> String {
        self.access_token.read().clone()
    }
}

impl Authenticator for OAuth2Authenticator {
    fn sign(&self, scope: &AuthScope) -> HeaderMap {
        let mut headers = HeaderMap::new();

        {
            let token = self.access_token.read();
            if !token.is_empty() {
                insert_header(
                    &mut headers,
                    AUTHORIZATION_HEADER,
                    &format!("{BEARER_AUTH_SCHEME} {token}"),
                );
            }
        }

        if let Some(link) = scope.shared_link() {
            insert_header(&mut headers, SHARED_LINK_HEADER, &format!("shared_link={link}"));
        }
        insert_on_behalf_of(&mut headers, scope);

        headers
    }

    fn scheme(&self) -> &'static str {
        "oauth2"
    }
}

impl std::fmt::Debug for OAuth2Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth2Authenticator").field("access_token", &"<redacted>").finish()
    }
}
