//! User CRUD request handlers.
//!
//! Identifiers arrive as raw path strings; the service layer decides whether
//! they are well-formed so a malformed id is a 400 and never a 404.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use crate::api::doc::USER_TAG;
use crate::api::dto::{
    CreateUserRequest, DeleteUserResponse, ErrorResponse, UpdateUserRequest, UserResponse,
};
use crate::error::{AppError, AppResult};
use crate::models::UserId;
use crate::state::AppState;
use crate::utils::ValidatedJson;

/// Creates user-related routes.
///
/// Routes:
/// - GET /         - List all users
/// - POST /        - Create a new user
/// - GET /{id}     - Get user by ID
/// - PUT /{id}     - Replace name and email
/// - DELETE /{id}  - Delete user by ID
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}

/// List all users in storage order.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = USER_TAG
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.services.users.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get a user by ID.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = USER_TAG
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users.get_user(&id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Create a new user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing fields or malformed body", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = USER_TAG
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .services
        .users
        .create_user(payload.into_new_user())
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Replace a user's name and email.
///
/// The identifier is checked before the body.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Malformed identifier, missing fields or malformed body", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = USER_TAG
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<ValidatedJson<UpdateUserRequest>, AppError>,
) -> AppResult<Json<UserResponse>> {
    UserId::parse(&id)?;
    let ValidatedJson(payload) = payload?;
    let user = state
        .services
        .users
        .update_user(&id, payload.into_changes())
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 200, description = "User deleted", body = DeleteUserResponse),
        (status = 400, description = "Malformed identifier", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = USER_TAG
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteUserResponse>> {
    state.services.users.delete_user(&id).await?;
    Ok(Json(DeleteUserResponse::default()))
}
