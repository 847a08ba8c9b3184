use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use super::{ApiError, AuthApi, LoginRequest, LoginResponse, MeResponse, UserProfile};
use crate::config::PortalConfig;

/// [`AuthApi`] over HTTP against the case service.
#[derive(Clone)]
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpAuthApi {
    pub fn new(config: &PortalConfig) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.url("/auth/login");

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "Login request failed");
                ApiError::Transport(e.to_string())
            })?;

        decode(response).await
    }

    async fn me(&self, token: &str) -> Result<UserProfile, ApiError> {
        let url = self.url("/auth/me");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "Session verification request failed");
                ApiError::Transport(e.to_string())
            })?;

        decode::<MeResponse>(response).await.map(|body| body.user)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    if status.is_success() {
        return serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()));
    }

    let message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_default();

    Err(match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        other => ApiError::Status {
            status: other.as_u16(),
            message,
        },
    })
}
