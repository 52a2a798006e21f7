//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
};
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    REQUEST_ID_HEADER, global_error_handler, handle_panic, logging_middleware,
    request_id_middleware,
};
use crate::config::ServerConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Layers run outermost first:
/// 1. Request ID - generates/propagates request IDs
/// 2. Logging - logs requests with request IDs
/// 3. CORS and compression
/// 4. Error normalisation - rewrites non-JSON error responses
/// 5. Panic catcher - turns handler panics into 500 responses
///
/// # Routes
/// - `/health`, `/health/ready`, `/health/live`
/// - `/api/users` - User CRUD operations
/// - `/api-docs/openapi.json`, `/swagger-ui`
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let api_routes = Router::new().nest("/users", handlers::users::user_routes());

    Router::new()
        .merge(handlers::health::health_routes())
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(server.body_limit))
        // Last added runs first
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(global_error_handler))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&server.allowed_origins))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

/// Credentialed CORS for the configured origins.
///
/// Origins are validated at config load time; any that still fail to parse
/// are skipped.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(Duration::from_secs(600))
}
