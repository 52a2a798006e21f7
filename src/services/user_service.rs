//! User service for business logic operations.
//!
//! Parses identifiers, enforces required fields and turns missing records
//! into `NotFound` errors before anything reaches the handlers.

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, UserChanges, UserId};
use crate::repositories::{DynUserRepository, StorageBackend};

/// User service wrapping whichever `UserRepository` was selected at startup.
#[derive(Clone)]
pub struct UserService {
    repo: DynUserRepository,
}

impl UserService {
    pub fn new(repo: DynUserRepository) -> Self {
        Self { repo }
    }

    /// The storage backend serving this service.
    pub fn backend(&self) -> StorageBackend {
        self.repo.backend()
    }

    /// Probes the storage backend.
    pub async fn check_storage(&self) -> AppResult<()> {
        self.repo.check().await
    }

    /// Lists all users in storage order.
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repo.list().await
    }

    /// Creates a new user.
    ///
    /// # Errors
    /// `Validation` if name or email is empty
    pub async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        require_field("name", &new_user.name)?;
        require_field("email", &new_user.email)?;
        self.repo.create(new_user).await
    }

    /// Gets a user by raw identifier.
    ///
    /// # Errors
    /// `Validation` for a malformed identifier, `NotFound` if absent
    pub async fn get_user(&self, raw_id: &str) -> AppResult<User> {
        let id = UserId::parse(raw_id)?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::user_not_found(id))
    }

    /// Replaces name and email of an existing user.
    ///
    /// The identifier is checked before the fields.
    pub async fn update_user(&self, raw_id: &str, changes: UserChanges) -> AppResult<User> {
        let id = UserId::parse(raw_id)?;
        require_field("name", &changes.name)?;
        require_field("email", &changes.email)?;
        self.repo
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::user_not_found(id))
    }

    /// Deletes a user.
    ///
    /// # Errors
    /// `Validation` for a malformed identifier, `NotFound` if absent
    pub async fn delete_user(&self, raw_id: &str) -> AppResult<()> {
        let id = UserId::parse(raw_id)?;
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::user_not_found(id))
        }
    }
}

fn require_field(field: &str, value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::Validation {
            field: field.to_string(),
            reason: "Name and email are required".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{InMemoryUserRepository, UserRepository};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryUserRepository::new()))
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    fn changes(name: &str, email: &str) -> UserChanges {
        UserChanges {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    /// Repository whose every call fails, as a dead connection would.
    struct FailingRepository;

    #[async_trait]
    impl UserRepository for FailingRepository {
        fn backend(&self) -> StorageBackend {
            StorageBackend::Postgres
        }

        async fn list(&self) -> AppResult<Vec<User>> {
            Err(AppError::database("list users", anyhow::anyhow!("connection reset")))
        }

        async fn create(&self, _: NewUser) -> AppResult<User> {
            Err(AppError::database("create user", anyhow::anyhow!("connection reset")))
        }

        async fn find_by_id(&self, _: UserId) -> AppResult<Option<User>> {
            Err(AppError::database("find user", anyhow::anyhow!("connection reset")))
        }

        async fn update(&self, _: UserId, _: UserChanges) -> AppResult<Option<User>> {
            Err(AppError::database("update user", anyhow::anyhow!("connection reset")))
        }

        async fn delete(&self, _: UserId) -> AppResult<bool> {
            Err(AppError::database("delete user", anyhow::anyhow!("connection reset")))
        }

        async fn check(&self) -> AppResult<()> {
            Err(AppError::database("ping", anyhow::anyhow!("connection reset")))
        }
    }

    #[tokio::test]
    async fn test_create_rejects_empty_fields() {
        let service = service();
        for (name, email) in [("", "a@b.com"), ("Ann", ""), ("", "")] {
            let err = service.create_user(new_user(name, email)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
        }
        assert!(service.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_id_is_validation_not_not_found() {
        let service = service();
        for raw in ["abc", "42", ""] {
            assert!(matches!(
                service.get_user(raw).await,
                Err(AppError::Validation { .. })
            ));
            assert!(matches!(
                service.update_user(raw, changes("", "")).await,
                Err(AppError::Validation { ref field, .. }) if field == "id"
            ));
            assert!(matches!(
                service.delete_user(raw).await,
                Err(AppError::Validation { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_absent_id_is_not_found() {
        let service = service();
        let raw = UserId::new_random().to_string();

        assert!(matches!(service.get_user(&raw).await, Err(AppError::NotFound { .. })));
        assert!(matches!(
            service.update_user(&raw, changes("a", "b")).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(service.delete_user(&raw).await, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let service = service();
        let created = service.create_user(new_user("Ann", "ann@x.com")).await.unwrap();
        let raw = created.id.to_string();

        assert_eq!(service.get_user(&raw).await.unwrap(), created);

        let updated = service
            .update_user(&raw, changes("Ann B", "annb@x.com"))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at.unwrap() > created.created_at);

        service.delete_user(&raw).await.unwrap();
        assert!(matches!(service.get_user(&raw).await, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_backend_failures_surface_as_server_errors() {
        let service = UserService::new(Arc::new(FailingRepository));
        let raw = UserId::new_random().to_string();

        assert!(service.list_users().await.unwrap_err().is_server_error());
        assert!(service.get_user(&raw).await.unwrap_err().is_server_error());
        assert!(service.delete_user(&raw).await.unwrap_err().is_server_error());
        assert!(service.check_storage().await.is_err());
    }

    proptest! {
        #[test]
        fn prop_malformed_ids_never_not_found(raw in "[g-z][g-z0-9 ]{0,39}") {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let result = runtime.block_on(service().get_user(&raw));
            let is_validation = matches!(result, Err(AppError::Validation { .. }));
            prop_assert!(is_validation);
        }
    }
}
