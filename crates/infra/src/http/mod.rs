//! HTTP transport

pub mod client;
pub mod response;

pub use client::{backoff_delay, HttpClient, HttpClientBuilder};
pub use response::RawResponse;
