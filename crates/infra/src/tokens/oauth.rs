//! OAuth2 authorization code flow

use boxapi_domain::{BoxError, OAuthCredentials, Result, TokenResponse, TokenSet};
use reqwest::Method;
use tracing::{info, instrument};
use url::Url;

use super::token_payload;
use crate::engine::RequestEngine;
use crate::errors::InfraError;
use crate::request::{ApiSurface, RequestDescriptor};

/// State value echoed back by the authorize redirect.
const AUTHORIZE_STATE: &str = "authenticated";

/// Client for the OAuth2 authorize/token/revoke endpoints.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    engine: RequestEngine,
    credentials: OAuthCredentials,
}

impl OAuthClient {
    #[must_use]
    pub fn new(engine: RequestEngine, credentials: OAuthCredentials) -> Self {
        Self { engine, credentials }
    }

    #[must_use]
    pub fn credentials(&self) -> &OAuthCredentials {
        &self.credentials
    }

    /// URL the user opens in a browser to grant access.
    ///
    /// # Errors
    /// Returns `BoxError::Config` if the configured OAuth base URL is invalid.
    pub fn authorization_url(&self) -> Result<String> {
        let base = self.engine.base_url(ApiSurface::OAuth).trim_end_matches('/');
        let mut url =
            Url::parse(&format!("{base}/authorize")).map_err(|e| BoxError::from(InfraError::from(e)))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.credentials.client_id)
                .append_pair("state", AUTHORIZE_STATE);
            if let Some(redirect_uri) = &self.credentials.redirect_uri {
                query.append_pair("redirect_uri", redirect_uri);
            }
        }

        Ok(url.into())
    }

    /// Exchange the authorization code from the redirect for tokens.
    ///
    /// # Errors
    /// `BoxError::InvalidArgument` for an empty code, `BoxError::Auth` when
    /// the endpoint rejects it.
    #[instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet> {
        if code.trim().is_empty() {
            return Err(BoxError::missing("code"));
        }

        let tokens = self
            .request_tokens(vec![
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .await?;
        info!(expires_in = tokens.expires_in, "obtained OAuth2 tokens");
        Ok(tokens)
    }

    /// Trade a refresh token for a fresh token pair.
    ///
    /// Refresh tokens are single use; the returned set carries its
    /// replacement.
    ///
    /// # Errors
    /// `BoxError::InvalidArgument` for an empty token, `BoxError::Auth` when
    /// the endpoint rejects it.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet> {
        if refresh_token.trim().is_empty() {
            return Err(BoxError::missing("refresh_token"));
        }

        let tokens = self
            .request_tokens(vec![
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .await?;
        info!(expires_in = tokens.expires_in, "refreshed OAuth2 tokens");
        Ok(tokens)
    }

    /// Invalidate an access or refresh token.
    ///
    /// # Errors
    /// `BoxError::InvalidArgument` for an empty token, `BoxError::Auth` when
    /// the endpoint rejects it.
    #[instrument(skip_all)]
    pub async fn revoke(&self, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(BoxError::missing("token"));
        }

        let descriptor = RequestDescriptor::builder(Method::POST, "/revoke")
            .surface(ApiSurface::OAuth)
            .form([
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("token", token),
            ])
            .unauthenticated()
            .build()?;

        let outcome = self.engine.dispatch(&descriptor).await?;
        token_payload::<serde_json::Value>(outcome).map(|_| ())?;
        info!("revoked OAuth2 token");
        Ok(())
    }

    async fn request_tokens(&self, params: Vec<(&str, &str)>) -> Result<TokenSet> {
        let descriptor = RequestDescriptor::builder(Method::POST, "/token")
            .surface(ApiSurface::OAuth)
            .form(params)
            .unauthenticated()
            .no_retry()
            .build()?;

        let outcome = self.engine.dispatch(&descriptor).await?;
        let response = token_payload::<TokenResponse>(outcome)?;
        if response.access_token.trim().is_empty() {
            return Err(BoxError::Auth("token endpoint returned an empty access token".into()));
        }
        Ok(TokenSet::from(response))
    }
}
