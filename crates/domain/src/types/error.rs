//! Wire-level error records returned by the remote service
//!
//! The service reports failures either as a single error object or as an
//! error collection wrapping several of them. Both shapes carry a `type`
//! discriminator; only a single object whose discriminator is exactly
//! [`ERROR_TYPE`] is a genuine error record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminator value of a single error record.
pub const ERROR_TYPE: &str = "error";

/// Discriminator value of an error collection.
pub const ERROR_COLLECTION_TYPE: &str = "error_collection";

/// A single structured error payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Type discriminator; `"error"` for a real error record
    #[serde(rename = "type", default)]
    pub kind: String,

    /// HTTP status code as reported in the body
    #[serde(default)]
    pub status: u16,

    /// Application error code (e.g. `not_found`, `item_name_in_use`)
    #[serde(default)]
    pub code: String,

    /// Human readable message
    #[serde(default)]
    pub message: String,

    /// Link to documentation for this error, when provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_url: Option<String>,

    /// Request correlation id for support requests
    #[serde(default)]
    pub request_id: String,

    /// Free-form extra details (conflicting items, field errors, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_info: Option<serde_json::Value>,
}

impl ApiErrorBody {
    /// Whether the discriminator marks this as a genuine error record.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == ERROR_TYPE
    }

    /// Build an error record from an HTTP status line when the service sent
    /// no structured envelope.
    #[must_use]
    pub fn from_status(status: u16, reason: &str) -> Self {
        Self {
            kind: ERROR_TYPE.to_string(),
            status,
            code: reason.to_ascii_lowercase().replace(' ', "_"),
            message: reason.to_string(),
            ..Self::default()
        }
    }
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        if !self.code.is_empty() {
            write!(f, " {}", self.code)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if !self.request_id.is_empty() {
            write!(f, " (request id {})", self.request_id)?;
        }
        Ok(())
    }
}

/// Several errors reported for a single call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorCollection {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub total_count: u64,

    #[serde(default)]
    pub entries: Vec<ApiErrorBody>,
}

impl ErrorCollection {
    /// The representative error: the first entry, if the collection declares
    /// a nonzero count.
    #[must_use]
    pub fn first_error(&self) -> Option<&ApiErrorBody> {
        if self.total_count == 0 {
            return None;
        }
        self.entries.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_parses_full_envelope() {
        let body = r#"{
            "type": "error",
            "status": 409,
            "code": "item_name_in_use",
            "help_url": "http://developers.box.com/docs/#errors",
            "message": "Item with the same name already exists",
            "request_id": "1234567",
            "context_info": {"conflicts": [{"type": "folder", "id": "42"}]}
        }"#;

        let error: ApiErrorBody = serde_json::from_str(body).unwrap();
        assert!(error.is_error());
        assert_eq!(error.status, 409);
        assert_eq!(error.code, "item_name_in_use");
        assert_eq!(error.request_id, "1234567");
        assert!(error.context_info.is_some());
    }

    #[test]
    fn test_collection_discriminator_is_not_an_error() {
        let body = r#"{"type":"error_collection","total_count":1,"entries":[]}"#;
        let error: ApiErrorBody = serde_json::from_str(body).unwrap();
        assert!(!error.is_error());
    }

    #[test]
    fn test_first_error_requires_nonzero_count() {
        let collection = ErrorCollection {
            kind: ERROR_COLLECTION_TYPE.to_string(),
            total_count: 0,
            entries: vec![ApiErrorBody::from_status(400, "Bad Request")],
        };
        assert!(collection.first_error().is_none());
    }

    #[test]
    fn test_from_status_builds_code_from_reason() {
        let error = ApiErrorBody::from_status(404, "Not Found");
        assert!(error.is_error());
        assert_eq!(error.code, "not_found");
        assert_eq!(error.to_string(), "404 not_found: Not Found");
    }
}
