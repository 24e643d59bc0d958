//! Wire types shared by the execution pipeline

pub mod auth;
pub mod error;

pub use auth::{
    AuthTokenResponse, OAuthCredentials, OAuthErrorBody, TicketResponse, TokenResponse, TokenSet,
};
pub use error::{ApiErrorBody, ErrorCollection, ERROR_COLLECTION_TYPE, ERROR_TYPE};
