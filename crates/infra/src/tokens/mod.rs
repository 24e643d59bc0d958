//! Token acquisition
//!
//! Clients for the endpoints that hand out credentials: the OAuth2
//! authorize/token/revoke endpoints and the legacy ticket actions. Their
//! requests are sent unsigned through the same [`RequestEngine`] as every
//! other call, so they share its transport, timeout and retry policy.
//!
//! [`RequestEngine`]: crate::engine::RequestEngine

pub mod oauth;
pub mod ticket;

use boxapi_domain::{BoxError, OAuthErrorBody, RemoteServiceError, Result};
use serde::de::DeserializeOwned;

use crate::engine::ExecutionOutcome;

pub use oauth::OAuthClient;
pub use ticket::TicketAuthClient;

/// Convert a token endpoint outcome into `T`.
///
/// Non-2xx responses carrying an OAuth2 error body become
/// `BoxError::Auth`; anything else keeps the engine's classification.
pub(crate) fn token_payload<T: DeserializeOwned>(outcome: ExecutionOutcome) -> Result<T> {
    match outcome {
        ExecutionOutcome::Success(response) if response.status.is_success() => response.json(),
        ExecutionOutcome::Success(response) => {
            match serde_json::from_slice::<OAuthErrorBody>(&response.body) {
                Ok(error) => Err(BoxError::Auth(error.to_string())),
                Err(_) => Err(BoxError::Auth(format!(
                    "token endpoint returned HTTP {}",
                    response.status.as_u16()
                ))),
            }
        }
        ExecutionOutcome::RemoteError { http_status, error } => {
            Err(RemoteServiceError::new(http_status, error).into())
        }
        ExecutionOutcome::TransportFailure(reason) => Err(BoxError::Transport(reason)),
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use reqwest::header::HeaderMap;
    use reqwest::StatusCode;
    use serde_json::Value;

    use super::*;
    use crate::http::RawResponse;

    fn success(status: StatusCode, body: &'static str) -> ExecutionOutcome {
        ExecutionOutcome::Success(RawResponse::new(status, HeaderMap::new(), Bytes::from_static(body.as_bytes())))
    }

    #[test]
    fn test_oauth_error_body_is_auth_error() {
        let outcome = success(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Auth code expired"}"#,
        );

        match token_payload::<Value>(outcome) {
            Err(BoxError::Auth(message)) => assert_eq!(message, "invalid_grant: Auth code expired"),
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_rejection_is_auth_error() {
        let outcome = success(StatusCode::UNAUTHORIZED, "nope");
        assert!(matches!(token_payload::<Value>(outcome), Err(BoxError::Auth(_))));
    }

    #[test]
    fn test_transport_failure_passes_through() {
        let outcome = ExecutionOutcome::TransportFailure("HTTP request timed out".into());
        assert!(matches!(token_payload::<Value>(outcome), Err(BoxError::Transport(_))));
    }
}
