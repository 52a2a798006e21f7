//! In-memory substitute storage.

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;

use super::{StorageBackend, UserRepository};
use crate::error::AppResult;
use crate::models::{NewUser, User, UserChanges, UserId};

/// Users held in a process-local list, in insertion order.
///
/// Each operation takes the lock for its whole read or mutation, so
/// concurrent handlers never observe a half-applied push or removal.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list holding the two example users.
    pub fn seeded() -> Self {
        let now = Timestamp::now();
        let users = [("John Doe", "john@example.com"), ("Jane Smith", "jane@example.com")]
            .into_iter()
            .map(|(name, email)| {
                User::create(
                    NewUser {
                        name: name.to_string(),
                        email: email.to_string(),
                    },
                    now,
                )
            })
            .collect();

        Self {
            users: RwLock::new(users),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let user = User::create(new_user, Timestamp::now());
        self.users.write().await.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> AppResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            user.apply(changes, Timestamp::now());
            user.clone()
        }))
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        let mut users = self.users.write().await;
        match users.iter().position(|u| u.id == id) {
            Some(index) => {
                users.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
