mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{read_json, OWNER_PASSWORD, TestApp};

#[tokio::test]
async fn login_issues_a_bearer_token() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            Some(json!({"username": "owner", "password": OWNER_PASSWORD})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    let token = body["access_token"].as_str().expect("token expected");

    // The issued token opens the staff surface
    let auth = format!("Bearer {}", token);
    let response = app
        .request_with_headers(
            Method::GET,
            "/api/v1/staff/orders",
            None,
            &[("authorization", &auth)],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_credentials_is_unauthorized() {
    let app = TestApp::new().await;

    for (username, password) in [("owner", "wrong"), ("intruder", OWNER_PASSWORD)] {
        let response = app
            .request(
                Method::POST,
                "/auth/login",
                Some(json!({"username": username, "password": password})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn staff_surface_is_forbidden_without_a_token() {
    let app = TestApp::new().await;

    for uri in [
        "/api/v1/staff/orders",
        "/api/v1/staff/food-items",
        "/api/v1/staff/dashboard",
    ] {
        let response = app.request(Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "uri {}", uri);
    }
}

#[tokio::test]
async fn garbage_token_is_forbidden() {
    let app = TestApp::new().await;
    let response = app
        .request_with_headers(
            Method::GET,
            "/api/v1/staff/orders",
            None,
            &[("authorization", "Bearer not-a-real-token")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn non_superuser_token_is_forbidden() {
    let app = TestApp::new().await;
    let token = app
        .state
        .auth
        .issue_token("usher", false)
        .expect("issue non-superuser token");

    let auth = format!("Bearer {}", token);
    let response = app
        .request_with_headers(
            Method::GET,
            "/api/v1/staff/orders",
            None,
            &[("authorization", &auth)],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn customer_surface_needs_no_token() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/menu", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/status", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}
