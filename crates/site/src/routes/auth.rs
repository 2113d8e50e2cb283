//! Session login, identity and logout.

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiJson, OkResponse};
use crate::error::{AppError, clear_sentry_user};
use crate::middleware::auth::RequireAdminAuth;
use crate::middleware::session::{removal_cookie, session_cookie, set_cookie_header};
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/whoami", get(whoami))
        .route("/api/auth/logout", post(logout))
}

/// Login request body. Missing fields are reported as validation errors.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub token: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub ok: bool,
    pub email: String,
    pub subject_id: String,
    pub is_super_admin: bool,
}

/// Exchange credentials for a session token.
///
/// The token is returned in the body and set as the session cookie.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.auth().login(&body.email, &body.password).await?;

    let cookie = set_cookie_header(&session_cookie(&session.token, state.secure_cookies()))
        .ok_or_else(|| AppError::Internal("Session cookie is not a valid header".to_string()))?;

    tracing::info!(
        subject_id = %session.admin.subject_id(),
        expires_at = %session.expires_at,
        "Admin logged in"
    );

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(LoginResponse {
            ok: true,
            token: session.token,
            email: session.admin.email.as_str().to_string(),
        }),
    ))
}

/// Describe the identity behind the current session.
pub async fn whoami(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Json<WhoAmIResponse> {
    let is_super_admin = state.auth().policy().is_super_admin(admin.email.as_str());

    Json(WhoAmIResponse {
        ok: true,
        subject_id: admin.subject_id(),
        email: admin.email.as_str().to_string(),
        is_super_admin,
    })
}

/// Clear the session cookie. Tokens are stateless, so this always succeeds.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    clear_sentry_user();

    let headers = set_cookie_header(&removal_cookie(state.secure_cookies()))
        .map(|value| (header::SET_COOKIE, value));

    (AppendHeaders(headers), Json(OkResponse::ok()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::super::test_support::{
        SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD, app, body_json, send, state, token_for,
    };
    use crate::middleware::session::SESSION_COOKIE_NAME;

    #[tokio::test]
    async fn test_login_sets_cookie_and_returns_token() {
        let state = state().await;
        let app = app(&state);

        let response = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "Founder@Example.org", "password": SUPER_ADMIN_PASSWORD})),
        )
        .await;

        let cookie = response
            .headers()
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=")));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=604800"));

        let (status, body) = body_json(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["email"], SUPER_ADMIN_EMAIL);
        assert!(body["token"].as_str().unwrap().contains('.'));
    }

    #[tokio::test]
    async fn test_login_failures() {
        let state = state().await;
        let app = app(&state);

        let cases = [
            (
                json!({"email": SUPER_ADMIN_EMAIL, "password": "wrong"}),
                StatusCode::UNAUTHORIZED,
            ),
            (
                json!({"email": "nobody@example.org", "password": "whatever"}),
                StatusCode::UNAUTHORIZED,
            ),
            (
                json!({"email": "not-an-email", "password": "whatever"}),
                StatusCode::BAD_REQUEST,
            ),
            (json!({"email": SUPER_ADMIN_EMAIL}), StatusCode::BAD_REQUEST),
        ];

        for (body, expected) in cases {
            let response = send(&app, Method::POST, "/api/auth/login", None, Some(body)).await;
            assert!(response.headers().get("set-cookie").is_none());
            let (status, body) = body_json(response).await;
            assert_eq!(status, expected);
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_unknown_and_wrong_password_are_indistinguishable() {
        let state = state().await;
        let app = app(&state);

        let (_, wrong) = body_json(
            send(
                &app,
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": SUPER_ADMIN_EMAIL, "password": "wrong"})),
            )
            .await,
        )
        .await;
        let (_, unknown) = body_json(
            send(
                &app,
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": "ghost@example.org", "password": "wrong"})),
            )
            .await,
        )
        .await;

        assert_eq!(wrong, unknown);
    }

    #[tokio::test]
    async fn test_whoami_requires_session() {
        let state = state().await;
        let app = app(&state);

        let (status, body) =
            body_json(send(&app, Method::GET, "/api/auth/whoami", None, None).await).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let (status, _) = body_json(
            send(&app, Method::GET, "/api/auth/whoami", Some("forged.token"), None).await,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_whoami_for_env_super_admin() {
        let state = state().await;
        let app = app(&state);
        let token = token_for(&state, SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD).await;

        let (status, body) = body_json(
            send(&app, Method::GET, "/api/auth/whoami", Some(&token), None).await,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], SUPER_ADMIN_EMAIL);
        assert_eq!(body["subject_id"], "env-super-admin");
        assert_eq!(body["is_super_admin"], true);
    }

    #[tokio::test]
    async fn test_logout_expires_cookie() {
        let state = state().await;
        let app = app(&state);

        let response = send(&app, Method::POST, "/api/auth/logout", None, None).await;
        let cookie = response
            .headers()
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.contains("Max-Age=0"));

        let (status, body) = body_json(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }
}
