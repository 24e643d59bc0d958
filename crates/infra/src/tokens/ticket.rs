//! Legacy ticket flow
//!
//! 1. `get_ticket` with the application's API key.
//! 2. The user opens [`TicketAuthClient::authorization_url`] and approves.
//! 3. `get_auth_token` trades the approved ticket for an auth token, which a
//!    [`LegacyAuthenticator`](crate::auth::LegacyAuthenticator) then carries.

use boxapi_domain::{AuthTokenResponse, BoxError, Result, TicketResponse};
use reqwest::Method;
use tracing::{info, instrument};

use super::token_payload;
use crate::engine::RequestEngine;
use crate::request::{ApiSurface, RequestDescriptor};

const GET_TICKET_OK: &str = "get_ticket_ok";
const GET_AUTH_TOKEN_OK: &str = "get_auth_token_ok";

/// Client for the legacy ticket actions.
#[derive(Debug, Clone)]
pub struct TicketAuthClient {
    engine: RequestEngine,
    api_key: String,
}

impl TicketAuthClient {
    #[must_use]
    pub fn new(engine: RequestEngine, api_key: impl Into<String>) -> Self {
        Self { engine, api_key: api_key.into() }
    }

    /// Request a fresh ticket.
    ///
    /// # Errors
    /// `BoxError::Auth` when the service answers with any status other than
    /// `get_ticket_ok`.
    #[instrument(skip_all)]
    pub async fn get_ticket(&self) -> Result<String> {
        let response: TicketResponse = self.action("get_ticket", None).await?;
        match (response.status.as_str(), response.ticket) {
            (GET_TICKET_OK, Some(ticket)) if !ticket.is_empty() => {
                info!("obtained legacy ticket");
                Ok(ticket)
            }
            (status, _) => Err(BoxError::Auth(status.to_string())),
        }
    }

    /// Page where the user approves `ticket`.
    ///
    /// # Errors
    /// `BoxError::InvalidArgument` for an empty ticket.
    pub fn authorization_url(&self, ticket: &str) -> Result<String> {
        let ticket = ticket.trim();
        if ticket.is_empty() {
            return Err(BoxError::missing("ticket"));
        }
        let base = self.engine.base_url(ApiSurface::Legacy).trim_end_matches('/');
        Ok(format!("{base}/auth/{}", urlencoding::encode(ticket)))
    }

    /// Trade an approved ticket for an auth token.
    ///
    /// # Errors
    /// `BoxError::InvalidArgument` for an empty ticket, `BoxError::Auth` when
    /// the service answers with any status other than `get_auth_token_ok`.
    #[instrument(skip_all)]
    pub async fn get_auth_token(&self, ticket: &str) -> Result<AuthTokenResponse> {
        if ticket.trim().is_empty() {
            return Err(BoxError::missing("ticket"));
        }

        let response: AuthTokenResponse = self.action("get_auth_token", Some(ticket.trim())).await?;
        let has_token = response.auth_token.as_deref().is_some_and(|t| !t.is_empty());
        if response.status != GET_AUTH_TOKEN_OK || !has_token {
            return Err(BoxError::Auth(response.status));
        }

        info!("obtained legacy auth token");
        Ok(response)
    }

    async fn action<T: serde::de::DeserializeOwned>(
        &self,
        action: &str,
        ticket: Option<&str>,
    ) -> Result<T> {
        let descriptor = RequestDescriptor::builder(Method::GET, "/rest")
            .surface(ApiSurface::Legacy)
            .query("action", action)
            .query("api_key", self.api_key.as_str())
            .query_opt("ticket", ticket)
            .unauthenticated()
            .build()?;

        token_payload(self.engine.dispatch(&descriptor).await?)
    }
}
