use async_trait::async_trait;
use std::sync::Mutex;

use super::{ApiError, AuthApi, LoginResponse, UserProfile};

/// Scripted [`AuthApi`] for tests and offline tooling. Each call returns the
/// configured result; calls are counted.
pub struct MockAuthApi {
    pub login_result: Mutex<Result<LoginResponse, ApiError>>,
    pub me_result: Mutex<Result<UserProfile, ApiError>>,
    pub calls: Mutex<Vec<String>>,
}

impl Default for MockAuthApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAuthApi {
    pub fn new() -> Self {
        Self {
            login_result: Mutex::new(Err(ApiError::Transport("no login scripted".into()))),
            me_result: Mutex::new(Err(ApiError::Transport("no verification scripted".into()))),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_login(self, result: Result<LoginResponse, ApiError>) -> Self {
        if let Ok(mut slot) = self.login_result.lock() {
            *slot = result;
        }
        self
    }

    pub fn with_me(self, result: Result<UserProfile, ApiError>) -> Self {
        if let Ok(mut slot) = self.me_result.lock() {
            *slot = result;
        }
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn login(&self, email: &str, _password: &str) -> Result<LoginResponse, ApiError> {
        self.record(format!("login:{}", email));
        self.login_result
            .lock()
            .map_err(|_| ApiError::Transport("mock poisoned".into()))?
            .clone()
    }

    async fn me(&self, token: &str) -> Result<UserProfile, ApiError> {
        self.record(format!("me:{}", token));
        self.me_result
            .lock()
            .map_err(|_| ApiError::Transport("mock poisoned".into()))?
            .clone()
    }
}
