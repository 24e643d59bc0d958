//! Async client facade
//!
//! [`BoxClient`] binds a [`RequestEngine`] to one authenticator and keeps a
//! default [`AuthScope`]. The default scope is copied into every descriptor
//! the client builds, so changing it never affects a request that has
//! already been built or is in flight.

use std::sync::Arc;

use boxapi_domain::{BoxError, ClientConfig, OAuthCredentials, Result, TokenSet};
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::auth::{AuthScope, Authenticator, LegacyAuthenticator, OAuth2Authenticator};
use crate::engine::RequestEngine;
use crate::http::RawResponse;
use crate::request::{Operation, RequestDescriptor, RequestDescriptorBuilder, Resource};
use crate::tokens::OAuthClient;

/// OAuth2 state needed to renew the access token in place.
struct OAuthSession {
    authenticator: Arc<OAuth2Authenticator>,
    client: OAuthClient,
    tokens: Mutex<TokenSet>,
}

pub struct BoxClient {
    engine: RequestEngine,
    default_scope: RwLock<AuthScope>,
    oauth: Option<OAuthSession>,
}

impl BoxClient {
    /// Client signing with an arbitrary authenticator.
    ///
    /// # Errors
    /// Returns `BoxError::Config` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, authenticator: Arc<dyn Authenticator>) -> Result<Self> {
        Ok(Self {
            engine: RequestEngine::new(config, authenticator)?,
            default_scope: RwLock::new(AuthScope::new()),
            oauth: None,
        })
    }

    /// Client for the legacy `BoxAuth` scheme.
    ///
    /// # Errors
    /// `BoxError::InvalidArgument` for an empty API key.
    pub fn with_legacy(
        config: ClientConfig,
        api_key: &str,
        auth_token: Option<&str>,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(BoxError::missing("api_key"));
        }
        let authenticator = match auth_token {
            Some(token) => LegacyAuthenticator::with_auth_token(api_key, token),
            None => LegacyAuthenticator::new(api_key),
        };
        Self::new(config, Arc::new(authenticator))
    }

    /// Client for OAuth2 bearer tokens that can renew them with
    /// [`BoxClient::refresh_oauth_tokens`].
    ///
    /// # Errors
    /// `BoxError::InvalidArgument` for an empty access token.
    pub fn with_oauth2(
        config: ClientConfig,
        credentials: OAuthCredentials,
        tokens: TokenSet,
    ) -> Result<Self> {
        if tokens.access_token.trim().is_empty() {
            return Err(BoxError::missing("access_token"));
        }

        let authenticator = Arc::new(OAuth2Authenticator::new(tokens.access_token.clone()));
        let engine = RequestEngine::new(config, authenticator.clone())?;
        let client = OAuthClient::new(engine.clone(), credentials);

        Ok(Self {
            engine,
            default_scope: RwLock::new(AuthScope::new()),
            oauth: Some(OAuthSession { authenticator, client, tokens: Mutex::new(tokens) }),
        })
    }

    #[must_use]
    pub fn engine(&self) -> &RequestEngine {
        &self.engine
    }

    /// OAuth2 endpoint client, for OAuth2-configured clients.
    #[must_use]
    pub fn oauth(&self) -> Option<&OAuthClient> {
        self.oauth.as_ref().map(|session| &session.client)
    }

    /// Current OAuth2 token set, for OAuth2-configured clients.
    #[must_use]
    pub fn tokens(&self) -> Option<TokenSet> {
        self.oauth.as_ref().map(|session| session.tokens.lock().clone())
    }

    /* ------------------------------ default scope ----------------------------- */

    pub fn set_shared_link(&self, link: impl Into<String>) {
        self.default_scope.write().set_shared_link(link);
    }

    pub fn clear_shared_link(&self) {
        self.default_scope.write().clear_shared_link();
    }

    pub fn set_on_behalf_of(&self, user_login: impl Into<String>) {
        self.default_scope.write().set_on_behalf_of(user_login);
    }

    pub fn clear_on_behalf_of(&self) {
        self.default_scope.write().clear_on_behalf_of();
    }

    /// Snapshot of the default scope.
    #[must_use]
    pub fn scope(&self) -> AuthScope {
        self.default_scope.read().clone()
    }

    /* -------------------------------- building -------------------------------- */

    /// Start a request carrying a snapshot of the default scope.
    #[must_use]
    pub fn request(&self, method: Method, path: impl Into<String>) -> RequestDescriptorBuilder {
        RequestDescriptor::builder(method, path).scope(self.scope())
    }

    /// Start a request for `operation` on `resource` with the default scope.
    ///
    /// # Errors
    /// `BoxError::InvalidArgument` when a required identifier is missing.
    pub fn resource(
        &self,
        resource: Resource,
        operation: Operation,
        id: Option<&str>,
    ) -> Result<RequestDescriptorBuilder> {
        Ok(RequestDescriptor::for_resource(resource, operation, id)?.scope(self.scope()))
    }

    /* ------------------------------- execution -------------------------------- */

    /// # Errors
    /// See [`RequestEngine::execute`].
    pub async fn execute<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<T> {
        self.engine.execute(descriptor).await
    }

    /// # Errors
    /// See [`RequestEngine::execute_raw`].
    pub async fn execute_raw(&self, descriptor: &RequestDescriptor) -> Result<RawResponse> {
        self.engine.execute_raw(descriptor).await
    }

    /// # Errors
    /// See [`RequestEngine::execute_with_callbacks`].
    pub fn execute_with_callbacks<T, S, F>(
        &self,
        descriptor: RequestDescriptor,
        on_success: Option<S>,
        on_failure: Option<F>,
    ) -> Result<JoinHandle<()>>
    where
        T: DeserializeOwned + Send + 'static,
        S: FnOnce(T) + Send + 'static,
        F: FnOnce(BoxError) + Send + 'static,
    {
        self.engine.execute_with_callbacks(descriptor, on_success, on_failure)
    }

    /* -------------------------------- helpers --------------------------------- */

    /// Fetch one item, optionally restricted to `fields`.
    ///
    /// # Errors
    /// `BoxError::InvalidArgument` for an empty id, otherwise as
    /// [`BoxClient::execute`].
    pub async fn get_item<T: DeserializeOwned>(
        &self,
        resource: Resource,
        id: &str,
        fields: &[&str],
    ) -> Result<T> {
        let descriptor =
            self.resource(resource, Operation::Get, Some(id))?.fields(fields.iter().copied()).build()?;
        self.execute(&descriptor).await
    }

    /// # Errors
    /// `BoxError::InvalidArgument` for an empty id, otherwise as
    /// [`BoxClient::execute`].
    pub async fn delete_item(&self, resource: Resource, id: &str) -> Result<()> {
        let descriptor = self.resource(resource, Operation::Delete, Some(id))?.build()?;
        self.execute(&descriptor).await
    }

    /// Download a file's content.
    ///
    /// # Errors
    /// `BoxError::InvalidArgument` for an empty id, otherwise as
    /// [`BoxClient::execute_raw`].
    pub async fn download_file(&self, file_id: &str) -> Result<Bytes> {
        let descriptor =
            self.resource(Resource::File, Operation::Download, Some(file_id))?.build()?;
        Ok(self.execute_raw(&descriptor).await?.body)
    }

    /// The user the credentials belong to.
    ///
    /// # Errors
    /// As [`BoxClient::execute`].
    pub async fn current_user<T: DeserializeOwned>(&self) -> Result<T> {
        let descriptor = self.request(Method::GET, "/users/me").build()?;
        self.execute(&descriptor).await
    }

    /// Renew the OAuth2 access token and start signing with it.
    ///
    /// # Errors
    /// `BoxError::Auth` if this client is not OAuth2-configured, holds no
    /// refresh token, or the token endpoint rejects the refresh.
    #[instrument(skip(self))]
    pub async fn refresh_oauth_tokens(&self) -> Result<TokenSet> {
        let session = self
            .oauth
            .as_ref()
            .ok_or_else(|| BoxError::Auth("client is not configured for OAuth2".into()))?;

        let refresh_token = session
            .tokens
            .lock()
            .refresh_token
            .clone()
            .ok_or_else(|| BoxError::Auth("no refresh token available".into()))?;

        let tokens = session.client.refresh(&refresh_token).await?;
        session.authenticator.replace_access_token(tokens.access_token.clone());
        *session.tokens.lock() = tokens.clone();
        info!("access token replaced");

        Ok(tokens)
    }
}

impl std::fmt::Debug for BoxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxClient")
            .field("engine", &self.engine)
            .field("default_scope", &*self.default_scope.read())
            .field("oauth", &self.oauth.is_some())
            .finish()
    }
}
