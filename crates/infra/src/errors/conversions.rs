//! Conversions from external infrastructure errors into domain errors.

use boxapi_domain::BoxError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub BoxError);

impl From<InfraError> for BoxError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<BoxError> for InfraError {
    fn from(value: BoxError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → BoxError */
/* -------------------------------------------------------------------------- */

/// Every reqwest failure means no usable response arrived, so all of them map
/// to `BoxError::Transport`; the message keeps the failure kind.
pub(crate) fn transport_message(err: &HttpError) -> String {
    if err.is_timeout() {
        return "HTTP request timed out".into();
    }

    #[cfg(not(target_arch = "wasm32"))]
    if err.is_connect() {
        return format!("HTTP connection failure: {err}");
    }

    if err.is_body() || err.is_decode() {
        return format!("failed to read HTTP response body: {err}");
    }

    if let Some(status) = err.status() {
        return format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown status")
        );
    }

    if err.is_builder() {
        return format!("invalid HTTP request: {err}");
    }

    format!("HTTP request failed: {err}")
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(BoxError::Transport(transport_message(&value)))
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → BoxError */
/* -------------------------------------------------------------------------- */

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        InfraError(BoxError::Config(format!("invalid URL: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn connection_refused_maps_to_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped: BoxError = InfraError::from(error).into();
        match mapped {
            BoxError::Transport(msg) => assert!(msg.contains("connection")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn status_errors_keep_the_status_line() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::BAD_GATEWAY))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: BoxError = InfraError::from(error).into();
        match mapped {
            BoxError::Transport(msg) => assert_eq!(msg, "HTTP 502 Bad Gateway"),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[test]
    fn url_parse_errors_are_config_errors() {
        let error = url::Url::parse("not a url").unwrap_err();
        let mapped: BoxError = InfraError::from(error).into();
        assert!(matches!(mapped, BoxError::Config(_)));
    }
}
