//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and handlers.

mod user_service;

pub use user_service::UserService;

use crate::repositories::DynUserRepository;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap: every service holds `Arc`s to its dependencies.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
}

impl Services {
    /// Creates the services on top of the repository chosen at startup.
    pub fn new(users: DynUserRepository) -> Self {
        Self {
            users: UserService::new(users),
        }
    }
}
