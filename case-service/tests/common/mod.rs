//! Shared setup for case-service integration tests.
//!
//! Builds the full router over an in-memory user directory, so requests go
//! through the same middleware stack as production.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response, StatusCode},
    Router,
};
use case_service::{
    build_router,
    config::CaseServiceConfig,
    models::{Role, UserProfile},
    services::{InMemoryUserDirectory, TokenService, UserDirectory},
    utils::Password,
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "case-service-integration-secret";
pub const LAWYER_EMAIL: &str = "joao.oliveira@lbm.com.br";
pub const LAWYER_PASSWORD: &str = "prazo-fatal-2024";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub tokens: TokenService,
    pub lawyer: UserProfile,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::with_config(CaseServiceConfig::for_tests(TEST_SECRET)).await
    }

    pub async fn with_config(config: CaseServiceConfig) -> Self {
        let users: Arc<dyn UserDirectory> = Arc::new(InMemoryUserDirectory::new());
        let state = AppState::new(config, users);

        let lawyer = state
            .auth_service
            .create_user(
                LAWYER_EMAIL,
                "Dr. João Oliveira",
                Role::Advogado,
                Password::new(LAWYER_PASSWORD.to_string()),
            )
            .await
            .expect("Failed to seed user");

        let router = build_router(state.clone()).expect("Failed to build router");

        Self {
            router,
            tokens: state.tokens.clone(),
            state,
            lawyer,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, body: &str, ip: [u8; 4]) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("Content-Type", "application/json")
                .extension(ConnectInfo(SocketAddr::from((ip, 8080))))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn get_me(&self, authorization: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri("/auth/me");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).expect("Response body is not JSON")
}

pub fn login_body(email: &str, password: &str) -> String {
    serde_json::json!({ "email": email, "password": password }).to_string()
}

pub fn assert_error(body: &serde_json::Value, status: StatusCode) {
    assert!(
        body["error"].is_string(),
        "expected an error body for {status}, got {body}"
    );
}
