use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::models::User;
use crate::services::{AuthError, Database};

/// Read side of the user collaborator.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, AuthError>;
}

#[async_trait]
impl IdentityStore for Database {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        self.find_user_by_email(email).await
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, AuthError> {
        self.find_user_by_id(user_id).await
    }
}

/// Identities held in memory, keyed by id.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) -> Result<(), AuthError> {
        self.users
            .write()
            .map_err(|e| AuthError::Storage(anyhow::anyhow!("Identity store lock poisoned: {}", e)))?
            .insert(user.id, user);
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self
            .users
            .read()
            .map_err(|e| AuthError::Storage(anyhow::anyhow!("Identity store lock poisoned: {}", e)))?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, AuthError> {
        let users = self
            .users
            .read()
            .map_err(|e| AuthError::Storage(anyhow::anyhow!("Identity store lock poisoned: {}", e)))?;
        Ok(users.get(&user_id).cloned())
    }
}
