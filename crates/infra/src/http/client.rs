use std::time::Duration;

use boxapi_domain::constants::DEFAULT_TIMEOUT_SECS;
use boxapi_domain::{BoxError, Result};
use reqwest::{Client as ReqwestClient, Proxy, Request};
use tracing::debug;

use super::RawResponse;
use crate::errors::InfraError;

/// Thin wrapper over `reqwest::Client` that sends one attempt and buffers the
/// whole response. Retry decisions belong to the engine, which needs the
/// classified outcome to make them.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Send `request` once and read the full body.
    ///
    /// # Errors
    /// Returns `BoxError::Transport` when no complete response was received
    /// (connect failure, timeout, reset while reading the body).
    pub async fn send(&self, request: Request) -> Result<RawResponse> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, url = %redacted(&url), "sending HTTP request");

        let response = self.client.execute(request).await.map_err(|err| {
            debug!(%method, url = %redacted(&url), error = %err, "HTTP request failed");
            BoxError::from(InfraError::from(err))
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|err| BoxError::from(InfraError::from(err)))?;
        debug!(%method, url = %redacted(&url), %status, bytes = body.len(), "received HTTP response");

        Ok(RawResponse::new(status, headers, body))
    }
}

/// Delay before retry number `attempt`: `2^attempt * base`.
#[must_use]
pub fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    let multiplier = 1u32 << attempt.min(16);
    base.saturating_mul(multiplier)
}

/// Query strings may carry API keys and tickets on the legacy endpoints.
fn redacted(url: &url::Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    proxy: Option<String>,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            proxy: None,
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Route every request through this proxy. Without one, environment
    /// proxy settings are ignored.
    pub fn proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout);

        builder = match self.proxy {
            Some(proxy) => builder.proxy(
                Proxy::all(&proxy)
                    .map_err(|e| BoxError::Config(format!("invalid proxy {proxy}: {e}")))?,
            ),
            None => builder.no_proxy(),
        };

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|err| BoxError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(HttpClient { client })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::{Method, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn backoff_is_base_two_exponential() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(1, base), Duration::from_millis(200));
        assert_eq!(backoff_delay(2, base), Duration::from_millis(400));
        assert_eq!(backoff_delay(3, base), Duration::from_millis(800));
    }

    #[tokio::test]
    async fn returns_buffered_response_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new().expect("http client");
        let request = Request::new(Method::GET, server.uri().parse().unwrap());
        let response = client.send(request).await.expect("response");

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.text(), "boom");
    }

    #[tokio::test]
    async fn network_failure_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::new().expect("http client");
        let request = Request::new(Method::GET, format!("http://{addr}").parse().unwrap());

        match client.send(request).await {
            Err(BoxError::Transport(msg)) => assert!(msg.to_lowercase().contains("http")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[test]
    fn invalid_proxy_is_config_error() {
        let result = HttpClient::builder().proxy(Some("http://bad host:3128".into())).build();
        assert!(matches!(result, Err(BoxError::Config(_))));
    }

    #[test]
    fn redacted_url_drops_query() {
        let url = url::Url::parse("https://www.box.com/api/1.0/rest?action=get_ticket&api_key=K")
            .unwrap();
        assert_eq!(redacted(&url), "https://www.box.com/api/1.0/rest");
    }
}
