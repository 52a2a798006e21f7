//! Error response DTOs.

use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

/// Standard error response format.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "code": "VALIDATION_ERROR",
    "message": "Name and email are required",
    "details": { "field": "name" }
}))]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Creates a new error response with code and message.
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
            request_id: None,
        }
    }

    pub fn validation_error(field: &str, reason: &str) -> Self {
        Self::new("VALIDATION_ERROR", reason).with_details(json!({ "field": field }))
    }

    pub fn not_found_error(entity: &str, field: &str, value: &str) -> Self {
        let mut entity_name = entity.to_string();
        if let Some(first) = entity_name.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        Self::new("NOT_FOUND", &format!("{} not found", entity_name)).with_details(json!({
            "entity": entity,
            "field": field,
            "value": value,
        }))
    }

    /// Adds details to the error response.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Adds request ID to the error response for correlation.
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}
