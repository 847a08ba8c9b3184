mod common;

use axum::http::StatusCode;
use case_service::models::Role;
use common::{json_body, login_body, TestApp, LAWYER_EMAIL, LAWYER_PASSWORD};

#[tokio::test]
async fn login_returns_token_and_profile() {
    let app = TestApp::spawn().await;

    let response = app
        .login(&login_body(LAWYER_EMAIL, LAWYER_PASSWORD), [10, 0, 0, 1])
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user"]["email"], LAWYER_EMAIL);
    assert_eq!(body["user"]["name"], "Dr. João Oliveira");
    assert_eq!(body["user"]["role"], "ADVOGADO");
    assert_eq!(body["user"]["id"], app.lawyer.id.to_string());
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());

    let token = body["token"].as_str().expect("token should be a string");
    let identity = app.tokens.verify(token).expect("issued token must verify");
    assert_eq!(identity.subject_id, app.lawyer.id);
    assert_eq!(identity.role, Role::Advogado);
}

#[tokio::test]
async fn login_email_is_case_insensitive() {
    let app = TestApp::spawn().await;

    let response = app
        .login(
            &login_body(&LAWYER_EMAIL.to_uppercase(), LAWYER_PASSWORD),
            [10, 0, 0, 1],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = TestApp::spawn().await;

    let wrong_password = app
        .login(&login_body(LAWYER_EMAIL, "not-the-password"), [10, 0, 0, 1])
        .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = json_body(wrong_password).await;

    let unknown = app
        .login(&login_body("ninguem@lbm.com.br", LAWYER_PASSWORD), [10, 0, 0, 1])
        .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown = json_body(unknown).await;

    assert_eq!(wrong_password, unknown);
    assert_eq!(unknown["error"], "Invalid email or password");
    assert!(unknown.get("token").is_none());
}

#[tokio::test]
async fn invalid_email_is_unprocessable() {
    let app = TestApp::spawn().await;

    let response = app
        .login(&login_body("not-an-email", "whatever"), [10, 0, 0, 1])
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid email format");
}

#[tokio::test]
async fn empty_password_is_unprocessable() {
    let app = TestApp::spawn().await;

    let response = app.login(&login_body(LAWYER_EMAIL, ""), [10, 0, 0, 1]).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Password is required");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = TestApp::spawn().await;

    for body in ["{not json", r#"{"email": "a@b.com"}"#, "[]"] {
        let response = app.login(body, [10, 0, 0, 1]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");

        let body = json_body(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
    }
}
