mod error;
mod http;
mod mock;

pub use error::ApiError;
pub use http::HttpAuthApi;
pub use mock::MockAuthApi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Profile as returned by the case service. The role stays a string so a
/// newer server role does not break older clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

/// The two auth round-trips the portal makes.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// Verify `token` and fetch the authoritative profile of its subject.
    async fn me(&self, token: &str) -> Result<UserProfile, ApiError>;
}
