//! # BoxApi Domain
//!
//! Pure types for the BoxApi client.
//!
//! This crate contains:
//! - Wire error records (`ApiErrorBody`, `ErrorCollection`)
//! - Token and ticket payloads
//! - The `BoxError` taxonomy and Result alias
//! - Client configuration and constants
//!
//! ## Architecture
//! - No dependencies on other BoxApi crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
