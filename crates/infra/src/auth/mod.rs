//! Request signing strategies
//!
//! An [`Authenticator`] turns its credentials plus a per-request
//! [`AuthScope`] into the headers stamped on an outgoing request. Two
//! interchangeable strategies exist for the two generations of the API:
//!
//! - [`LegacyAuthenticator`]: `Authorization: BoxAuth api_key=..&auth_token=..`
//! - [`OAuth2Authenticator`]: `Authorization: Bearer ..` plus an optional
//!   `BoxApi: shared_link=..` header
//!
//! [`NullAuthenticator`] signs nothing and is reserved for the
//! token-acquisition endpoints.
//!
//! Signing never fails: a value that cannot be carried in an HTTP header is
//! dropped with a warning.

pub mod legacy;
pub mod oauth2;
pub mod scope;

pub use legacy::LegacyAuthenticator;
pub use oauth2::OAuth2Authenticator;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
pub use scope::AuthScope;
use tracing::warn;

/// Stamps outgoing requests with credentials.
pub trait Authenticator: Send + Sync {
    /// Headers carrying the credentials and `scope`.
    fn sign(&self, scope: &AuthScope) -> HeaderMap;

    /// Short scheme label for logs; never contains credentials.
    fn scheme(&self) -> &'static str;
}

/// Signs nothing. Used for the unauthenticated token endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuthenticator;

impl Authenticator for NullAuthenticator {
    fn sign(&self, _scope: &AuthScope) -> HeaderMap {
        HeaderMap::new()
    }

    fn scheme(&self) -> &'static str {
        "none"
    }
}

/// Insert `value` under `name`, dropping it if it is not valid in a header.
pub(crate) fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    let (Ok(header_name), Ok(mut header_value)) =
        (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value))
    else {
        warn!(header = name, "dropping header value that is not valid in HTTP");
        return;
    };
    header_value.set_sensitive(header_name == reqwest::header::AUTHORIZATION);
    headers.insert(header_name, header_value);
}

/// Add the `On-Behalf-Of` header shared by both strategies.
pub(crate) fn insert_on_behalf_of(headers: &mut HeaderMap, scope: &AuthScope) {
    if let Some(login) = scope.on_behalf_of() {
        insert_header(headers, boxapi_domain::constants::ON_BEHALF_OF_HEADER, login);
    }
}
