use utoipa::OpenApi;

pub const USER_TAG: &str = "User";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Roster",
        description = "User management API",
    ),
    paths(
        crate::api::handlers::users::list_users,
        crate::api::handlers::users::get_user,
        crate::api::handlers::users::create_user,
        crate::api::handlers::users::update_user,
        crate::api::handlers::users::delete_user,
        crate::api::handlers::health::health_check,
        crate::api::handlers::health::readiness_check,
        crate::api::handlers::health::liveness_check,
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::api::dto::UserResponse,
            crate::api::dto::CreateUserRequest,
            crate::api::dto::UpdateUserRequest,
            crate::api::dto::DeleteUserResponse,
            crate::api::dto::HealthResponse,
            crate::api::dto::HealthStatus,
            crate::api::dto::ComponentHealth,
            crate::repositories::StorageBackend,
        )
    ),
    tags(
        (name = USER_TAG, description = "User management endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
