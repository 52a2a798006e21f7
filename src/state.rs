//! Application state for Axum web framework.
//!
//! Contains shared services accessible across all request handlers.

use crate::repositories::DynUserRepository;
use crate::services::Services;

/// Application state containing all shared services.
///
/// Cloning is cheap since every service holds `Arc`s internally.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Version reported by the health endpoints
    pub version: String,
}

impl AppState {
    /// Creates a new AppState around the repository chosen at startup.
    ///
    /// # Example
    /// ```ignore
    /// let repo = select_user_repository(&settings.database, false).await;
    /// let state = AppState::new(repo, settings.application.version.clone());
    /// ```
    pub fn new(users: DynUserRepository, version: impl Into<String>) -> Self {
        Self {
            services: Services::new(users),
            version: version.into(),
        }
    }
}
