//! Office user accounts.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Role;

/// Stored user, including the password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub password_hash: String,
}

impl User {
    pub fn new(email: String, name: String, role: Role, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            role,
            avatar_url: None,
            password_hash,
        }
    }

    /// Convert to the client-facing profile (no credential material).
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// User profile as returned by `/auth/login` and `/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    #[schema(example = "admin@lbm.com.br")]
    pub email: String,
    #[schema(example = "Dr. Carlos Silva")]
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}
