use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::models::User;

/// Lookup interface over the office's user records.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, anyhow::Error>;
    async fn insert(&self, user: User) -> Result<(), anyhow::Error>;
    async fn health_check(&self) -> Result<(), anyhow::Error>;
}

/// Process-local directory, used for the bootstrap account and in tests.
#[derive(Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_err<T>(_: T) -> anyhow::Error {
        anyhow::anyhow!("User directory lock poisoned")
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let users = self.users.read().map_err(Self::lock_err)?;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, anyhow::Error> {
        let users = self.users.read().map_err(Self::lock_err)?;
        Ok(users.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<(), anyhow::Error> {
        let mut users = self.users.write().map_err(Self::lock_err)?;
        if users
            .values()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(anyhow::anyhow!("Email already registered: {}", user.email));
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        self.users.read().map(|_| ()).map_err(Self::lock_err)
    }
}
