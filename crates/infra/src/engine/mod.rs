//! Request execution engine
//!
//! Sends [`RequestDescriptor`]s, classifies what comes back and converts it
//! into a typed value or a [`BoxError`].
//!
//! # Outcomes
//!
//! Every attempt ends in exactly one [`ExecutionOutcome`]:
//!
//! - `Success`: a response that is not a structured error. 5xx responses
//!   without an error envelope are not successes; they count as transport
//!   failures.
//! - `RemoteError`: the service sent an error object or error collection.
//!   Never retried.
//! - `TransportFailure`: no usable response. When `retry_on_server_error` is
//!   enabled, the first such failure is retried once after `2^1 * 100ms`.
//!
//! The same policy applies to the awaited, blocking and callback entry
//! points; they all run through [`RequestEngine::dispatch`].

pub mod callbacks;
pub mod classifier;

use std::sync::Arc;
use std::time::Duration;

use boxapi_domain::constants::{MAX_RETRIES, RETRY_BASE_DELAY_MS};
use boxapi_domain::{ApiErrorBody, BoxError, ClientConfig, RemoteServiceError, Result};
pub use classifier::{classify, Classification};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::auth::{Authenticator, NullAuthenticator};
use crate::http::{backoff_delay, HttpClient, RawResponse};
use crate::request::{ApiSurface, RequestDescriptor};

/// What a single attempt produced.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// A response that is not a structured error
    Success(RawResponse),
    /// The service sent an error object or error collection
    RemoteError { http_status: u16, error: ApiErrorBody },
    /// No usable response: connect failure, timeout or un-enveloped 5xx
    TransportFailure(String),
}

/// Sends descriptors with the configured authenticator.
///
/// Cloning is cheap; clones share the HTTP connection pool and the
/// authenticator.
#[derive(Clone)]
pub struct RequestEngine {
    http: HttpClient,
    config: Arc<ClientConfig>,
    authenticator: Arc<dyn Authenticator>,
    retry_base_delay: Duration,
}

impl RequestEngine {
    /// Create an engine for `config`, signing with `authenticator`.
    ///
    /// # Errors
    /// Returns `BoxError::Config` if the HTTP client cannot be built (e.g. an
    /// invalid proxy).
    pub fn new(config: ClientConfig, authenticator: Arc<dyn Authenticator>) -> Result<Self> {
        let mut builder = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .proxy(config.proxy.clone());
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        Ok(Self {
            http: builder.build()?,
            config: Arc::new(config),
            authenticator,
            retry_base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
        })
    }

    /// Override the backoff base (default 100ms).
    #[must_use]
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    #[must_use]
    pub fn base_url(&self, surface: ApiSurface) -> &str {
        match surface {
            ApiSurface::Api => &self.config.base_url,
            ApiSurface::Upload => &self.config.upload_url,
            ApiSurface::OAuth => &self.config.oauth_url,
            ApiSurface::Legacy => &self.config.legacy_url,
        }
    }

    /// Credential headers for `descriptor`; empty for token-acquisition
    /// requests.
    #[must_use]
    pub fn sign(&self, descriptor: &RequestDescriptor) -> HeaderMap {
        if descriptor.is_authenticated() {
            self.authenticator.sign(descriptor.scope())
        } else {
            NullAuthenticator.sign(descriptor.scope())
        }
    }

    /// Render `descriptor` into the exact request that would be sent.
    ///
    /// # Errors
    /// Propagates rendering errors from [`RequestDescriptor::to_http`].
    pub fn build_request(&self, descriptor: &RequestDescriptor) -> Result<reqwest::Request> {
        descriptor.to_http(self.base_url(descriptor.surface()), self.sign(descriptor))
    }

    /// Send `descriptor`, retrying once on transport failure if enabled, and
    /// return the classified outcome of the last attempt.
    ///
    /// # Errors
    /// Only fails before sending, when the descriptor cannot be rendered.
    #[instrument(
        skip(self, descriptor),
        fields(method = %descriptor.method(), path = %descriptor.path(), scheme = self.scheme(descriptor))
    )]
    pub async fn dispatch(&self, descriptor: &RequestDescriptor) -> Result<ExecutionOutcome> {
        let mut attempt: u32 = 1;
        loop {
            let outcome = self.attempt(descriptor).await?;

            match outcome {
                ExecutionOutcome::TransportFailure(reason) if self.may_retry(descriptor, attempt) => {
                    let delay = backoff_delay(attempt, self.retry_base_delay);
                    warn!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        reason = %reason,
                        "transport failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return Ok(other),
            }
        }
    }

    /// Execute and return the raw response (file content downloads).
    ///
    /// # Errors
    /// `BoxError::Remote` for structured errors and un-enveloped 4xx
    /// responses, `BoxError::Transport` when no usable response arrived.
    pub async fn execute_raw(&self, descriptor: &RequestDescriptor) -> Result<RawResponse> {
        match self.dispatch(descriptor).await? {
            ExecutionOutcome::Success(response) if response.status.is_client_error() => {
                let status = response.status;
                let error = ApiErrorBody::from_status(
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Client Error"),
                );
                Err(RemoteServiceError::new(status.as_u16(), error).into())
            }
            ExecutionOutcome::Success(response) => Ok(response),
            ExecutionOutcome::RemoteError { http_status, error } => {
                debug!(status = error.status, code = %error.code, "remote service error");
                Err(RemoteServiceError::new(http_status, error).into())
            }
            ExecutionOutcome::TransportFailure(reason) => Err(BoxError::Transport(reason)),
        }
    }

    /// Execute and deserialize the success payload into `T`.
    ///
    /// # Errors
    /// As [`RequestEngine::execute_raw`], plus `BoxError::Serialization` when
    /// the payload does not match `T`.
    pub async fn execute<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<T> {
        self.execute_raw(descriptor).await?.json()
    }

    async fn attempt(&self, descriptor: &RequestDescriptor) -> Result<ExecutionOutcome> {
        let request = self.build_request(descriptor)?;

        let response = match self.http.send(request).await {
            Ok(response) => response,
            Err(BoxError::Transport(reason)) => {
                return Ok(ExecutionOutcome::TransportFailure(reason));
            }
            Err(other) => return Err(other),
        };

        Ok(Self::classify_response(response))
    }

    /// Classify a buffered response into an outcome.
    #[must_use]
    pub fn classify_response(response: RawResponse) -> ExecutionOutcome {
        match classify(response.content_type(), &response.body) {
            Classification::RemoteError(error) => ExecutionOutcome::RemoteError {
                http_status: response.status.as_u16(),
                error,
            },
            Classification::Success if response.status.is_server_error() => {
                ExecutionOutcome::TransportFailure(format!(
                    "HTTP {} {}",
                    response.status.as_u16(),
                    response.status.canonical_reason().unwrap_or("server error")
                ))
            }
            Classification::Success => ExecutionOutcome::Success(response),
        }
    }

    fn may_retry(&self, descriptor: &RequestDescriptor, attempt: u32) -> bool {
        self.config.retry_on_server_error && descriptor.is_retryable() && attempt <= MAX_RETRIES
    }

    fn scheme(&self, descriptor: &RequestDescriptor) -> &'static str {
        if descriptor.is_authenticated() {
            self.authenticator.scheme()
        } else {
            "none"
        }
    }
}

impl std::fmt::Debug for RequestEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestEngine")
            .field("base_url", &self.config.base_url)
            .field("scheme", &self.authenticator.scheme())
            .field("retry_on_server_error", &self.config.retry_on_server_error)
            .finish()
    }
}
