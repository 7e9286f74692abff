//! Process-local user store.
//!
//! Records live in a `RwLock<HashMap>` and are lost on restart. Email
//! uniqueness is enforced under the write lock, so two concurrent inserts of
//! the same address cannot both succeed.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::NewUser;
use crate::domain::identity::models::UpdateProfileCommand;
use crate::domain::identity::models::User;
use crate::domain::identity::models::UserId;
use crate::domain::identity::ports::UserRepository;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<UserId, User>, email: &str, excluded: Option<&UserId>) -> bool {
    users
        .values()
        .any(|user| user.email.as_str() == email && Some(&user.id) != excluded)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, IdentityError> {
        let mut users = self.users.write().await;
        if email_taken(&users, user.email.as_str(), None) {
            return Err(IdentityError::DuplicateIdentity(
                user.email.as_str().to_string(),
            ));
        }

        let now = Utc::now();
        let created = User {
            id: UserId::new(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            bio: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, IdentityError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, IdentityError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.email.as_str() == email)
            .cloned())
    }

    async fn find_by_email_excluding(
        &self,
        email: &str,
        excluded: &UserId,
    ) -> Result<Option<User>, IdentityError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.email.as_str() == email && user.id != *excluded)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        changes: &UpdateProfileCommand,
    ) -> Result<Option<User>, IdentityError> {
        let mut users = self.users.write().await;
        if email_taken(&users, changes.email.as_str(), Some(id)) {
            return Err(IdentityError::DuplicateIdentity(
                changes.email.as_str().to_string(),
            ));
        }

        let Some(user) = users.get_mut(id) else {
            return Ok(None);
        };
        user.first_name = changes.first_name.clone();
        user.last_name = changes.last_name.clone();
        user.email = changes.email.clone();
        user.bio = changes.bio.clone();
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, IdentityError> {
        let mut users = self.users.write().await;
        match users.get_mut(id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
