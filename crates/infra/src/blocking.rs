//! Blocking client
//!
//! Wraps [`BoxClient`] with a private runtime. Each call blocks the caller
//! for one round trip, or two plus the backoff sleep when a transport failure
//! is retried. [`BlockingBoxClient::execute_with_callbacks`] returns at once;
//! its request runs on the runtime's worker thread. Must not be used from
//! inside an async runtime.

use boxapi_domain::{BoxError, ClientConfig, OAuthCredentials, Result, TokenSet};
use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

use crate::client::BoxClient;
use crate::http::RawResponse;
use crate::request::{RequestDescriptor, RequestDescriptorBuilder, Resource};

#[derive(Debug)]
pub struct BlockingBoxClient {
    inner: BoxClient,
    runtime: Runtime,
}

impl BlockingBoxClient {
    /// Wrap an async client.
    ///
    /// # Errors
    /// Returns `BoxError::Config` if the runtime cannot be started.
    pub fn new(inner: BoxClient) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("boxapi-blocking")
            .enable_all()
            .build()
            .map_err(|e| BoxError::Config(format!("failed to start runtime: {e}")))?;
        Ok(Self { inner, runtime })
    }

    /// # Errors
    /// See [`BoxClient::with_legacy`].
    pub fn with_legacy(config: ClientConfig, api_key: &str, auth_token: Option<&str>) -> Result<Self> {
        Self::new(BoxClient::with_legacy(config, api_key, auth_token)?)
    }

    /// # Errors
    /// See [`BoxClient::with_oauth2`].
    pub fn with_oauth2(
        config: ClientConfig,
        credentials: OAuthCredentials,
        tokens: TokenSet,
    ) -> Result<Self> {
        Self::new(BoxClient::with_oauth2(config, credentials, tokens)?)
    }

    #[must_use]
    pub fn inner(&self) -> &BoxClient {
        &self.inner
    }

    pub fn set_shared_link(&self, link: impl Into<String>) {
        self.inner.set_shared_link(link);
    }

    pub fn clear_shared_link(&self) {
        self.inner.clear_shared_link();
    }

    pub fn set_on_behalf_of(&self, user_login: impl Into<String>) {
        self.inner.set_on_behalf_of(user_login);
    }

    pub fn clear_on_behalf_of(&self) {
        self.inner.clear_on_behalf_of();
    }

    #[must_use]
    pub fn request(&self, method: Method, path: impl Into<String>) -> RequestDescriptorBuilder {
        self.inner.request(method, path)
    }

    /// # Errors
    /// See [`BoxClient::execute`].
    pub fn execute<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<T> {
        self.runtime.block_on(self.inner.execute(descriptor))
    }

    /// # Errors
    /// See [`BoxClient::execute_raw`].
    pub fn execute_raw(&self, descriptor: &RequestDescriptor) -> Result<RawResponse> {
        self.runtime.block_on(self.inner.execute_raw(descriptor))
    }

    /// Start `descriptor` in the background and deliver the result to one of
    /// the callbacks, which run on the runtime's worker thread.
    ///
    /// # Errors
    /// `BoxError::InvalidArgument` when `on_success` is `None`; nothing is
    /// sent in that case.
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
        let _entered = self.runtime.enter();
        self.inner.execute_with_callbacks(descriptor, on_success, on_failure)
    }

    /// # Errors
    /// See [`BoxClient::get_item`].
    pub fn get_item<T: DeserializeOwned>(&self, resource: Resource, id: &str, fields: &[&str]) -> Result<T> {
        self.runtime.block_on(self.inner.get_item(resource, id, fields))
    }

    /// # Errors
    /// See [`BoxClient::delete_item`].
    pub fn delete_item(&self, resource: Resource, id: &str) -> Result<()> {
        self.runtime.block_on(self.inner.delete_item(resource, id))
    }

    /// # Errors
    /// See [`BoxClient::download_file`].
    pub fn download_file(&self, file_id: &str) -> Result<Bytes> {
        self.runtime.block_on(self.inner.download_file(file_id))
    }

    /// # Errors
    /// See [`BoxClient::current_user`].
    pub fn current_user<T: DeserializeOwned>(&self) -> Result<T> {
        self.runtime.block_on(self.inner.current_user())
    }

    /// # Errors
    /// See [`BoxClient::refresh_oauth_tokens`].
    pub fn refresh_oauth_tokens(&self) -> Result<TokenSet> {
        self.runtime.block_on(self.inner.refresh_oauth_tokens())
    }
}
