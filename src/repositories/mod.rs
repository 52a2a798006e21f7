//! Repository layer for user storage.
//!
//! `UserRepository` is the storage interface the service layer talks to.
//! Two backends implement it: the PostgreSQL store and the in-memory
//! substitute list. Which one runs is decided once, at startup, by
//! [`select_user_repository`].

mod memory_user_repo;
mod pg_user_repo;
mod selection;

pub use memory_user_repo::InMemoryUserRepository;
pub use pg_user_repo::PgUserRepository;
pub use selection::select_user_repository;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::models::{NewUser, User, UserChanges, UserId};

/// Which storage backend is serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Live PostgreSQL store
    Postgres,
    /// In-process substitute list
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Postgres => "postgres",
            StorageBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage capabilities needed by the user endpoints.
///
/// `update` and `find_by_id` return `None` and `delete` returns `false`
/// when no record has the given id; mapping that to a not-found error is
/// the service layer's job.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// The backend behind this repository.
    fn backend(&self) -> StorageBackend;

    /// All users in storage-defined order.
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Persists a new user, assigning its id and creation timestamp.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Replaces name and email and sets the update timestamp.
    async fn update(&self, id: UserId, changes: UserChanges) -> AppResult<Option<User>>;

    /// Removes a user, returning whether a record was deleted.
    async fn delete(&self, id: UserId) -> AppResult<bool>;

    /// Checks the backend can serve requests.
    async fn check(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Shared handle to the repository chosen at startup.
pub type DynUserRepository = Arc<dyn UserRepository>;
