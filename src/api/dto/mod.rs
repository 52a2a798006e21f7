//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `user` - User-related request/response DTOs
//! - `health` - Health check responses
//! - `error` - Common error response DTOs

mod error;
mod health;
mod user;

pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use user::{CreateUserRequest, DeleteUserResponse, UpdateUserRequest, UserResponse};
