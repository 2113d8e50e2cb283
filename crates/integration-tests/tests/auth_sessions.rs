//! Integration tests for login, session verification and logout.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use serde_json::json;

use trustline_integration_tests::{SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD, TestContext};

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_cookie_session_round_trip() {
    let ctx = TestContext::new().await;

    let login = ctx
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": SUPER_ADMIN_EMAIL, "password": SUPER_ADMIN_PASSWORD})),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let cookie = login.set_cookie().unwrap();
    let pair = cookie.split(';').next().unwrap().to_string();

    let request = Request::builder()
        .uri("/api/auth/whoami")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let whoami = ctx.send(request).await;

    assert_eq!(whoami.status, StatusCode::OK);
    assert_eq!(whoami.body["email"], SUPER_ADMIN_EMAIL);
    assert_eq!(whoami.body["is_super_admin"], true);
}

#[tokio::test]
async fn test_stored_admin_identity() {
    let ctx = TestContext::new().await;
    let token = ctx.admin_token("treasurer@example.org", "ledger-pass-1").await;

    let whoami = ctx
        .request(Method::GET, "/api/auth/whoami", Some(&token), None)
        .await;

    assert_eq!(whoami.status, StatusCode::OK);
    assert_eq!(whoami.body["email"], "treasurer@example.org");
    assert_eq!(whoami.body["is_super_admin"], false);
    assert!(whoami.body["subject_id"].as_str().unwrap().parse::<i32>().is_ok());
}

#[tokio::test]
async fn test_stored_record_takes_precedence_over_fallback() {
    let ctx = TestContext::new().await;
    let root = ctx.super_admin_token().await;

    let created = ctx
        .request(
            Method::POST,
            "/api/admins/create",
            Some(&root),
            Some(json!({"email": SUPER_ADMIN_EMAIL, "password": "stored-password"})),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let env_login = ctx
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": SUPER_ADMIN_EMAIL, "password": SUPER_ADMIN_PASSWORD})),
        )
        .await;
    assert_eq!(env_login.status, StatusCode::UNAUTHORIZED);

    let token = ctx.login(SUPER_ADMIN_EMAIL, "stored-password").await;
    let whoami = ctx
        .request(Method::GET, "/api/auth/whoami", Some(&token), None)
        .await;
    assert_eq!(whoami.body["subject_id"], created.body["admin"]["id"].to_string());
    assert_eq!(whoami.body["is_super_admin"], true);
}

#[tokio::test]
async fn test_failed_logins_share_one_message() {
    let ctx = TestContext::new().await;
    ctx.admin_token("volunteer@example.org", "volunteer-pass").await;

    let mut bodies = Vec::new();
    for (email, password) in [
        ("volunteer@example.org", "wrong-pass"),
        ("nobody@example.org", "wrong-pass"),
        (SUPER_ADMIN_EMAIL, "wrong-pass"),
    ] {
        let response = ctx
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        bodies.push(response.body);
    }

    assert!(bodies.iter().all(|b| *b == json!({"error": "Invalid email or password"})));
}

// =============================================================================
// Session verification
// =============================================================================

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let ctx = TestContext::new().await;
    let token = ctx.sign_token(
        SUPER_ADMIN_EMAIL,
        "env-super-admin",
        Utc::now().timestamp() - 1,
    );

    let response = ctx
        .request(Method::GET, "/api/auth/whoami", Some(&token), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, json!({"error": "Unauthorized"}));
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let ctx = TestContext::new().await;
    let token = ctx.super_admin_token().await;
    let (payload, signature) = token.split_once('.').unwrap();

    let forged_payload = ctx
        .sign_token("intruder@example.org", "env-super-admin", Utc::now().timestamp() + 60)
        .split_once('.')
        .unwrap()
        .0
        .to_string();

    for bad in [
        format!("{forged_payload}.{signature}"),
        format!("{payload}.{}", "A".repeat(signature.len())),
        payload.to_string(),
        String::new(),
    ] {
        let response = ctx
            .request(Method::GET, "/api/auth/whoami", Some(&bad), None)
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "token {bad:?}");
    }
}

#[tokio::test]
async fn test_bearer_token_used_despite_stale_cookie() {
    let ctx = TestContext::new().await;
    let token = ctx.super_admin_token().await;
    let stale = ctx.sign_token(
        SUPER_ADMIN_EMAIL,
        "env-super-admin",
        Utc::now().timestamp() - 60,
    );

    let request = Request::builder()
        .uri("/api/auth/whoami")
        .header(header::COOKIE, format!("tl_session={stale}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = ctx.send(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["email"], SUPER_ADMIN_EMAIL);
}

#[tokio::test]
async fn test_token_with_unknown_subject_is_rejected() {
    let ctx = TestContext::new().await;
    let token = ctx.sign_token(SUPER_ADMIN_EMAIL, "root", Utc::now().timestamp() + 60);

    let response = ctx
        .request(Method::GET, "/api/auth/whoami", Some(&token), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Logout and operational endpoints
// =============================================================================

#[tokio::test]
async fn test_logout_clears_cookie() {
    let ctx = TestContext::new().await;

    let response = ctx
        .request(Method::POST, "/api/auth/logout", None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"ok": true}));
    let cookie = response.set_cookie().unwrap();
    assert!(cookie.starts_with("tl_session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new().await;

    let live = ctx.request(Method::GET, "/health", None, None).await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, json!("ok"));

    let ready = ctx.request(Method::GET, "/health/ready", None, None).await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_and_security_headers() {
    let ctx = TestContext::new().await;

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = ctx.send(request).await;
    assert_eq!(response.headers["x-request-id"], "req-123");
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");

    let generated = ctx.request(Method::GET, "/health", None, None).await;
    assert!(!generated.headers["x-request-id"].is_empty());
}
