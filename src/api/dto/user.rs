//! User-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{NewUser, User, UserChanges};

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for creating a new user.
///
/// Fields are optional at the serde level so a missing field surfaces as a
/// validation error rather than a JSON parse error.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(
        required(message = "Name and email are required"),
        length(min = 1, message = "Name and email are required")
    )]
    #[schema(value_type = String, min_length = 1, example = "Ann")]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(
        required(message = "Name and email are required"),
        length(min = 1, message = "Name and email are required")
    )]
    #[schema(value_type = String, min_length = 1, example = "ann@example.com")]
    pub email: Option<String>,
}

impl CreateUserRequest {
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
        }
    }
}

/// Request body for replacing a user's name and email.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    #[serde(default)]
    #[validate(
        required(message = "Name and email are required"),
        length(min = 1, message = "Name and email are required")
    )]
    #[schema(value_type = String, min_length = 1, example = "Ann B")]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(
        required(message = "Name and email are required"),
        length(min = 1, message = "Name and email are required")
    )]
    #[schema(value_type = String, min_length = 1, example = "annb@example.com")]
    pub email: Option<String>,
}

impl UpdateUserRequest {
    pub fn into_changes(self) -> UserChanges {
        UserChanges {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
        }
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Response body for user data.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Creation time (RFC 3339)
    #[schema(value_type = String, format = DateTime)]
    pub created_at: String,
    /// Last update time (RFC 3339), null until the first update
    #[schema(value_type = Option<String>, format = DateTime)]
    pub updated_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_uuid(),
            name: user.name,
            email: user.email,
            created_at: user.created_at.to_string(),
            updated_at: user.updated_at.map(|ts| ts.to_string()),
        }
    }
}

/// Acknowledgment returned after a delete.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteUserResponse {
    #[schema(example = "User deleted successfully")]
    pub message: String,
}

impl Default for DeleteUserResponse {
    fn default() -> Self {
        Self {
            message: "User deleted successfully".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;

    const REQUIRED_MESSAGE: &str = "Name and email are required";

    #[test]
    fn test_missing_fields_fail_validation() {
        let request: CreateUserRequest = serde_json::from_str(r#"{"name":"Ann"}"#).unwrap();
        let errors = request.validate().unwrap_err();
        let email = &errors.field_errors()["email"];
        assert_eq!(email[0].message.as_deref(), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_empty_fields_fail_validation() {
        let request: UpdateUserRequest =
            serde_json::from_str(r#"{"name":"","email":"a@b.com"}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_complete_request_converts() {
        let request: CreateUserRequest =
            serde_json::from_str(r#"{"name":"Ann","email":"ann@x.com"}"#).unwrap();
        assert!(request.validate().is_ok());
        let new_user = request.into_new_user();
        assert_eq!(new_user.name, "Ann");
        assert_eq!(new_user.email, "ann@x.com");
    }

    #[test]
    fn test_user_response_shape() {
        let created_at: Timestamp = "2025-01-01T12:00:00Z".parse().unwrap();
        let user = User::create(
            NewUser {
                name: "Ann".to_string(),
                email: "ann@x.com".to_string(),
            },
            created_at,
        );
        let id = user.id;

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json["created_at"], "2025-01-01T12:00:00Z");
        assert!(json["updated_at"].is_null());
    }

    #[test]
    fn test_delete_ack_message() {
        let json = serde_json::to_value(DeleteUserResponse::default()).unwrap();
        assert_eq!(json["message"], "User deleted successfully");
    }
}
