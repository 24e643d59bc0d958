//! # BoxApi Infrastructure
//!
//! Request execution and authentication pipeline for the Box content API.
//!
//! This crate contains:
//! - Authenticators for the legacy `BoxAuth` and OAuth2 bearer schemes
//! - Request descriptors and their deterministic HTTP rendering
//! - The HTTP transport and response classifier
//! - The execution engine (async, blocking and callback entry points)
//! - OAuth2 and legacy ticket token clients
//! - Configuration loading
//!
//! ## Architecture
//! - Pure types live in `boxapi-domain`
//! - Everything that performs I/O lives here

pub mod auth;
pub mod blocking;
pub mod client;
pub mod config;
pub mod engine;
pub mod errors;
pub mod http;
pub mod request;
pub mod tokens;

pub use auth::{AuthScope, Authenticator, LegacyAuthenticator, NullAuthenticator, OAuth2Authenticator};
pub use blocking::BlockingBoxClient;
pub use client::BoxClient;
pub use engine::{Classification, ExecutionOutcome, RequestEngine};
pub use errors::InfraError;
pub use http::{HttpClient, RawResponse};
pub use request::{ApiSurface, Operation, RequestBody, RequestDescriptor, RequestDescriptorBuilder, Resource};
pub use tokens::{OAuthClient, TicketAuthClient};
