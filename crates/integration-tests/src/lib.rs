//! Integration tests for Trustline.
//!
//! The tests drive the full site router (guards, middleware and handlers)
//! against in-memory stores, so no database or network is needed. The
//! `PostgreSQL` repository tests are ignored by default and need a database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p trustline-integration-tests
//! cargo test -p trustline-integration-tests -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use trustline_site::config::{FallbackPassword, SessionConfig};
use trustline_site::models::SessionClaims;
use trustline_site::services::auth::TokenSigner;
use trustline_site::state::{AppState, Stores};

pub const SUPER_ADMIN_EMAIL: &str = "founder@example.org";
pub const SUPER_ADMIN_PASSWORD: &str = "env-fallback-pass";
const SIGNING_SECRET: &str = "k9#Vq2!xLm7@Rt4$Zp8^Wc3&Hn6*Jb1%";

/// A router wired to fresh in-memory stores.
pub struct TestContext {
    pub state: AppState,
    pub router: Router,
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `Set-Cookie` header, if any.
    #[must_use]
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }
}

impl TestContext {
    /// Context with the env super admin configured.
    pub async fn new() -> Self {
        Self::with_super_admin(Some(SUPER_ADMIN_EMAIL)).await
    }

    /// Context with an optional super-admin email and the fallback password.
    pub async fn with_super_admin(email: Option<&str>) -> Self {
        let session = SessionConfig::new(
            SecretString::from(SIGNING_SECRET),
            email,
            email.map(|_| FallbackPassword::Plain(SecretString::from(SUPER_ADMIN_PASSWORD))),
            false,
        )
        .unwrap();
        let console_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../site/console");
        let state = AppState::new(&session, Stores::in_memory(), console_dir)
            .await
            .unwrap();
        let router = trustline_site::build_router(state.clone());

        Self { state, router }
    }

    /// Send a request with an optional bearer token and JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Send a prepared request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Log in through the API and return the token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {response:?}");
        response.body["token"].as_str().unwrap().to_string()
    }

    /// Token for the env super admin.
    pub async fn super_admin_token(&self) -> String {
        self.login(SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD).await
    }

    /// Sign arbitrary claims with the context's secret.
    #[must_use]
    pub fn sign_token(&self, email: &str, sub: &str, exp: i64) -> String {
        TokenSigner::new(SecretString::from(SIGNING_SECRET))
            .sign(&SessionClaims {
                email: email.to_string(),
                sub: sub.to_string(),
                exp,
            })
            .unwrap()
    }

    /// Create a regular admin as the super admin and return its token.
    pub async fn admin_token(&self, email: &str, password: &str) -> String {
        let root = self.super_admin_token().await;
        let response = self
            .request(
                Method::POST,
                "/api/admins/create",
                Some(&root),
                Some(serde_json::json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        self.login(email, password).await
    }
}
