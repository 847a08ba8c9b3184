use std::sync::Arc;
use uuid::Uuid;

use crate::{
    dtos::auth::{LoginRequest, LoginResponse},
    models::{Role, User, UserProfile},
    services::{ServiceError, TokenService, UserDirectory},
    utils::{hash_password, verify_against_dummy, verify_password, Password, PasswordHashString},
};

/// Credential checks and profile lookups behind the `/auth` routes.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserDirectory>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserDirectory>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let password = Password::new(req.password);

        let user = match self.users.find_by_email(&req.email).await? {
            Some(user) => user,
            None => {
                verify_against_dummy(&password);
                tracing::info!("Login rejected: unknown email");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        let hash = PasswordHashString::new(user.password_hash.clone());
        if verify_password(&password, &hash).is_err() {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, user.role)?;

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(LoginResponse {
            token,
            user: user.profile(),
        })
    }

    /// Canonical profile for the subject of a verified token.
    pub async fn current_user(&self, subject_id: Uuid) -> Result<UserProfile, ServiceError> {
        self.users
            .find_by_id(subject_id)
            .await?
            .map(|user| user.profile())
            .ok_or(ServiceError::UserNotFound)
    }

    /// Create an account with a freshly hashed password.
    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        role: Role,
        password: Password,
    ) -> Result<UserProfile, ServiceError> {
        let hash = hash_password(&password)?;
        let user = User::new(email.trim().to_string(), name.to_string(), role, hash.into_string());
        let profile = user.profile();

        self.users.insert(user).await?;
        tracing::info!(user_id = %profile.id, role = %profile.role, "User created");

        Ok(profile)
    }

    /// Seed the bootstrap administrator unless an account with that email exists.
    pub async fn ensure_admin(
        &self,
        email: &str,
        name: &str,
        password: Password,
    ) -> Result<(), ServiceError> {
        if self.users.find_by_email(email).await?.is_some() {
            tracing::debug!("Bootstrap admin already present");
            return Ok(());
        }

        self.create_user(email, name, Role::Admin, password).await?;
        Ok(())
    }
}
