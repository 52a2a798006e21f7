//! User repository backed by PostgreSQL.
//!
//! Provides the user CRUD operations on the `users` table using diesel_async.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;

use super::{StorageBackend, UserRepository};
use crate::db::{self, AsyncDbPool};
use crate::error::{AppError, AppResult};
use crate::models::{
    NewUser, NewUserRecord, User, UserChanges, UserChangeset, UserId, UserRecord, update_timestamp,
};

/// PostgreSQL user repository holding an async connection pool.
///
/// `AsyncDbPool` is reference counted internally, so cloning is cheap.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: AsyncDbPool,
}

impl PgUserRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Postgres
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        let records = users
            .order((created_at.asc(), id.asc()))
            .select(UserRecord::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| AppError::database("list users", e))?;

        Ok(records.into_iter().map(User::from).collect())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        let record = diesel::insert_into(users)
            .values(NewUserRecord::new(new_user, Timestamp::now()))
            .returning(UserRecord::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|e| AppError::database("create user", e))?;

        Ok(record.into())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        let record = users
            .filter(id.eq(user_id.as_uuid()))
            .select(UserRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| AppError::database("find user", e))?;

        Ok(record.map(User::from))
    }

    async fn update(&self, user_id: UserId, changes: UserChanges) -> AppResult<Option<User>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        let current = users
            .filter(id.eq(user_id.as_uuid()))
            .select(UserRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| AppError::database("find user", e))?;

        let Some(current) = current else {
            return Ok(None);
        };
        let stamp = update_timestamp(current.created_at.to_jiff(), Timestamp::now());

        let record = diesel::update(users.filter(id.eq(user_id.as_uuid())))
            .set(UserChangeset::new(changes, stamp))
            .returning(UserRecord::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|e| AppError::database("update user", e))?;

        Ok(record.map(User::from))
    }

    async fn delete(&self, user_id: UserId) -> AppResult<bool> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(users.filter(id.eq(user_id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(|e| AppError::database("delete user", e))?;

        Ok(deleted > 0)
    }

    async fn check(&self) -> AppResult<()> {
        db::ping(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::{establish_async_connection_pool, run_migrations};

    /// Connects to `DATABASE_URL` and brings the schema up to date.
    async fn repository() -> PgUserRepository {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        run_migrations(&url).await.unwrap();

        let config = DatabaseConfig {
            enabled: true,
            url,
            ..DatabaseConfig::default()
        };
        PgUserRepository::new(establish_async_connection_pool(&config).await.unwrap())
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_create_find_and_list() {
        let repo = repository().await;
        repo.check().await.unwrap();

        let created = repo.create(new_user("Ann", "ann@x.com")).await.unwrap();
        assert!(created.updated_at.is_none());

        let found = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);

        let listed = repo.list().await.unwrap();
        assert!(listed.iter().any(|u| u.id == created.id));

        repo.delete(created.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_update_keeps_identity_and_stamps_after_creation() {
        let repo = repository().await;
        let created = repo.create(new_user("Ann", "ann@x.com")).await.unwrap();

        let updated = repo
            .update(
                created.id,
                UserChanges {
                    name: "Ann B".to_string(),
                    email: "annb@x.com".to_string(),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Ann B");
        assert_eq!(updated.email, "annb@x.com");
        assert!(updated.updated_at.unwrap() > updated.created_at);

        let found = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found, updated);

        repo.delete(created.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_delete_then_absent() {
        let repo = repository().await;
        let created = repo.create(new_user("Ann", "ann@x.com")).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
        assert!(!repo.delete(created.id).await.unwrap());

        let changes = UserChanges {
            name: "Ghost".to_string(),
            email: "ghost@x.com".to_string(),
        };
        assert!(repo.update(created.id, changes).await.unwrap().is_none());
    }
}
