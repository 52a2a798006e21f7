//! Error handler for converting AppError to HTTP responses.
//!
//! Client errors carry their message to the caller. Server errors are
//! logged with their source chain and answered with a generic body.

use std::any::Any;

use axum::{
    Json,
    body::Body,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

/// Upper bound on a framework error body read back for normalisation.
const MAX_ERROR_BODY: usize = 64 * 1024;

impl IntoResponse for AppError {
    /// # Status Code Mapping
    /// - Validation, BadRequest → 400
    /// - NotFound, RouteNotFound → 404
    /// - PayloadTooLarge → 413
    /// - UnsupportedMediaType → 415
    /// - Database, Configuration, Internal → 500
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        let error_response = match &self {
            AppError::NotFound {
                entity,
                field,
                value,
            } => ErrorResponse::not_found_error(entity, field, value),
            AppError::RouteNotFound => ErrorResponse::new("NOT_FOUND", "Route not found"),
            AppError::Validation { field, reason } => ErrorResponse::validation_error(field, reason),
            AppError::BadRequest { message } => ErrorResponse::new("BAD_REQUEST", message),
            AppError::PayloadTooLarge { message } => {
                ErrorResponse::new("PAYLOAD_TOO_LARGE", message)
            }
            AppError::UnsupportedMediaType { message } => {
                ErrorResponse::new("UNSUPPORTED_MEDIA_TYPE", message)
            }
            AppError::Database { operation, source } => {
                tracing::error!(operation = %operation, error = ?source, "Storage operation failed");
                ErrorResponse::new("INTERNAL_ERROR", "Something went wrong!")
            }
            AppError::Configuration { message } => {
                tracing::error!(message = %message, "Configuration error while serving request");
                ErrorResponse::new("INTERNAL_ERROR", "Something went wrong!")
            }
            AppError::Internal { source } => {
                tracing::error!(error = ?source, "Internal error");
                ErrorResponse::new("INTERNAL_ERROR", "Something went wrong!")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Maps an AppError variant to its corresponding HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } | AppError::RouteNotFound => StatusCode::NOT_FOUND,
        AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        AppError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        AppError::Database { .. } | AppError::Configuration { .. } | AppError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Global error handling middleware.
///
/// Error responses produced outside the handlers (405 from the router, 413
/// from the body limit, ...) are plain text; this rewrites any error
/// response that is not already JSON into an `ErrorResponse` tagged with
/// the request id.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone());
    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if is_json {
        return response;
    }

    let (parts, body) = response.into_parts();
    let original_message = axum::body::to_bytes(body, MAX_ERROR_BODY)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();

    let mut error_response = normalize_status(status, original_message);
    if let Some(request_id) = request_id {
        error_response = error_response.with_request_id(&request_id);
    }

    let mut normalized = (status, Json(error_response)).into_response();
    for name in [header::ALLOW, header::VARY] {
        if let Some(value) = parts.headers.get(&name) {
            normalized.headers_mut().insert(name, value.clone());
        }
    }
    normalized
}

fn normalize_status(status: StatusCode, original_message: String) -> ErrorResponse {
    let (code, fallback) = match status {
        StatusCode::BAD_REQUEST => ("BAD_REQUEST", "Bad request"),
        StatusCode::NOT_FOUND => ("NOT_FOUND", "Route not found"),
        StatusCode::METHOD_NOT_ALLOWED => {
            ("METHOD_NOT_ALLOWED", "HTTP method not allowed for this endpoint")
        }
        StatusCode::PAYLOAD_TOO_LARGE => ("PAYLOAD_TOO_LARGE", "Request payload too large"),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type"),
        s if s.is_server_error() => {
            // Never echo a server-side body back to the client
            return ErrorResponse::new("INTERNAL_ERROR", "Something went wrong!");
        }
        _ => ("CLIENT_ERROR", "Request could not be processed"),
    };

    if original_message.is_empty() {
        ErrorResponse::new(code, fallback)
    } else {
        ErrorResponse::new(code, &original_message)
    }
}

/// Turns a handler panic into the generic 500 body.
///
/// Installed through `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "code": "INTERNAL_ERROR",
            "message": "Something went wrong!",
        })),
    )
        .into_response()
}
