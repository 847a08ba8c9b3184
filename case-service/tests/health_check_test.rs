mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{json_body, TestApp};

#[tokio::test]
async fn health_check_is_public() {
    let app = TestApp::spawn().await;

    let response = app
        .send(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers()["x-content-type-options"],
        "nosniff"
    );

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "case-service-test");
}

#[tokio::test]
async fn openapi_document_lists_auth_routes() {
    let app = TestApp::spawn().await;

    let response = app
        .send(
            Request::builder()
                .uri("/.well-known/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["paths"]["/auth/login"].is_object());
    assert!(body["paths"]["/auth/me"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}
