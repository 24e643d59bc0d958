//! Response classification
//!
//! The service reports failures in two JSON shapes that share the same
//! `"type":"error"` substring: a single error object and an error collection
//! whose entries are single errors. Classification is a staged parse:
//!
//! 1. [`looks_like_error`]: JSON content type and the discriminator
//!    substring in the body. Anything else is a success.
//! 2. [`parse_single_error`]: strict single-error parse, accepted only when
//!    its discriminator is exactly `"error"`.
//! 3. [`parse_error_collection`]: collection parse, accepted when it declares
//!    a nonzero count; its first entry is the representative error.
//! 4. Otherwise the body is handed to the caller's deserializer as a success.

use boxapi_domain::{ApiErrorBody, ErrorCollection};

/// Result of inspecting a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Not an error envelope; the body is the payload
    Success,
    /// A single error object, or the first entry of an error collection
    RemoteError(ApiErrorBody),
}

/// Classify a response from its content type and raw body.
#[must_use]
pub fn classify(content_type: Option<&str>, body: &[u8]) -> Classification {
    if !looks_like_error(content_type, body) {
        return Classification::Success;
    }

    if let Some(error) = parse_single_error(body) {
        return Classification::RemoteError(error);
    }

    match parse_error_collection(body) {
        Some(error) => Classification::RemoteError(error),
        None => Classification::Success,
    }
}

/// Stage 1: JSON content type and an `"type":"error"` discriminator somewhere
/// in the body. Whitespace around the colon is tolerated.
#[must_use]
pub fn looks_like_error(content_type: Option<&str>, body: &[u8]) -> bool {
    if !content_type.is_some_and(is_json) {
        return false;
    }

    let Ok(text) = std::str::from_utf8(body) else {
        return false;
    };

    let mut rest = text;
    while let Some(idx) = rest.find("\"type\"") {
        let after = rest[idx + "\"type\"".len()..].trim_start();
        if let Some(value) = after.strip_prefix(':') {
            if value.trim_start().starts_with("\"error") {
                return true;
            }
        }
        rest = &rest[idx + 1..];
    }
    false
}

/// Stage 2: a single error object whose discriminator is exactly `"error"`.
#[must_use]
pub fn parse_single_error(body: &[u8]) -> Option<ApiErrorBody> {
    serde_json::from_slice::<ApiErrorBody>(body).ok().filter(ApiErrorBody::is_error)
}

/// Stage 3: an error collection with a nonzero count; yields its first entry.
#[must_use]
pub fn parse_error_collection(body: &[u8]) -> Option<ApiErrorBody> {
    serde_json::from_slice::<ErrorCollection>(body).ok()?.first_error().cloned()
}

fn is_json(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json") || mime == "text/json"
}
