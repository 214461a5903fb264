use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

/// Error codes carried in the `error` field of the failure envelope.
pub mod codes {
    pub const METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const RATE_LIMIT_EXCEEDED: &str = "RATE_LIMIT_EXCEEDED";
    pub const CORS_ERROR: &str = "CORS_ERROR";
    pub const INVALID_CONTENT_TYPE: &str = "INVALID_CONTENT_TYPE";
    pub const PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INVALID_ID: &str = "INVALID_ID";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// One violated constraint. `message` is fixed per rule; `value` echoes what
/// the client sent so all problems can be fixed in one round trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Uniform success envelope: `{success: true, data, message?, timestamp}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Uniform failure envelope:
/// `{success: false, error, message, validationErrors?, timestamp}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    #[serde(rename = "validationErrors", skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<ValidationError>>,
    pub timestamp: String,
}

impl ApiError {
    pub fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error,
            message: message.into(),
            validation_errors: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_validation(
        error: &'static str,
        message: impl Into<String>,
        errors: Vec<ValidationError>,
    ) -> Self {
        Self {
            validation_errors: Some(errors),
            ..Self::new(error, message)
        }
    }
}
