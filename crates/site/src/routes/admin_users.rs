//! Admin account management (super admin only).

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use trustline_core::AdminUserId;

use super::{ApiJson, ApiQuery, OkResponse};
use crate::error::AppError;
use crate::middleware::auth::RequireSuperAdmin;
use crate::models::{AdminUser, CreateAdminInput, UpdatePasswordInput};
use crate::services::AdminUserService;
use crate::state::AppState;

/// Build the admin management router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admins/create", post(create_admin))
        .route("/api/admins/delete", delete(delete_admin))
        .route("/api/admins/list", get(list_admins))
        .route("/api/admins/update-password", patch(update_password))
}

#[derive(Debug, Deserialize)]
pub struct DeleteAdminQuery {
    pub id: AdminUserId,
}

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub ok: bool,
    pub admin: AdminUser,
}

#[derive(Debug, Serialize)]
pub struct AdminListResponse {
    pub ok: bool,
    pub admins: Vec<AdminUser>,
}

fn service(state: &AppState) -> AdminUserService<'_> {
    AdminUserService::new(state.credentials(), state.auth().policy())
}

/// Create an admin account.
#[instrument(skip_all, fields(by = %admin.email))]
pub async fn create_admin(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateAdminInput>,
) -> Result<(StatusCode, Json<AdminResponse>), AppError> {
    let created = service(&state).create(&body.email, &body.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(AdminResponse {
            ok: true,
            admin: created,
        }),
    ))
}

/// Delete an admin account by id.
#[instrument(skip_all, fields(by = %admin.email, target = %query.id))]
pub async fn delete_admin(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DeleteAdminQuery>,
) -> Result<Json<OkResponse>, AppError> {
    service(&state).delete(query.id).await?;
    Ok(Json(OkResponse::ok()))
}

/// List admin accounts, newest first.
pub async fn list_admins(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<Json<AdminListResponse>, AppError> {
    let admins = service(&state).list().await?;
    Ok(Json(AdminListResponse { ok: true, admins }))
}

/// Replace an admin's password.
#[instrument(skip_all, fields(by = %admin.email, target = %body.id))]
pub async fn update_password(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdatePasswordInput>,
) -> Result<Json<OkResponse>, AppError> {
    service(&state)
        .update_password(body.id, &body.password)
        .await?;
    Ok(Json(OkResponse::ok()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::super::test_support::{
        SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD, app, body_json, send, state, token_for,
    };

    #[tokio::test]
    async fn test_super_admin_manages_accounts() {
        let state = state().await;
        let app = app(&state);
        let token = token_for(&state, SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD).await;

        let (status, body) = body_json(
            send(
                &app,
                Method::POST,
                "/api/admins/create",
                Some(&token),
                Some(json!({"email": "Treasurer@Example.org", "password": "ledger-pass-1"})),
            )
            .await,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["ok"], true);
        assert_eq!(body["admin"]["email"], "treasurer@example.org");
        assert!(body["admin"].get("password_hash").is_none());
        let id = body["admin"]["id"].as_i64().unwrap();

        let (status, body) =
            body_json(send(&app, Method::GET, "/api/admins/list", Some(&token), None).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["admins"].as_array().unwrap().len(), 1);

        let (status, _) = body_json(
            send(
                &app,
                Method::PATCH,
                "/api/admins/update-password",
                Some(&token),
                Some(json!({"id": id, "password": "new-ledger-pass"})),
            )
            .await,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            state
                .auth()
                .login("treasurer@example.org", "new-ledger-pass")
                .await
                .is_ok()
        );

        let (status, body) = body_json(
            send(
                &app,
                Method::DELETE,
                &format!("/api/admins/delete?id={id}"),
                Some(&token),
                None,
            )
            .await,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_regular_admin_is_forbidden() {
        let state = state().await;
        let app = app(&state);
        let root = token_for(&state, SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD).await;
        send(
            &app,
            Method::POST,
            "/api/admins/create",
            Some(&root),
            Some(json!({"email": "volunteer@example.org", "password": "volunteer-1"})),
        )
        .await;
        let token = token_for(&state, "volunteer@example.org", "volunteer-1").await;

        let (status, body) =
            body_json(send(&app, Method::GET, "/api/admins/list", Some(&token), None).await).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].is_string());

        let (status, _) =
            body_json(send(&app, Method::GET, "/api/admins/list", None, None).await).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    async fn create(
        app: &axum::Router,
        token: &str,
        email: &str,
        password: &str,
    ) -> axum::response::Response {
        send(
            app,
            Method::POST,
            "/api/admins/create",
            Some(token),
            Some(json!({"email": email, "password": password})),
        )
        .await
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let state = state().await;
        let app = app(&state);
        let token = token_for(&state, SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD).await;

        assert_eq!(
            create(&app, &token, "dup@example.org", "password-1").await.status(),
            StatusCode::CREATED
        );
        assert_eq!(
            create(&app, &token, "DUP@example.org", "password-2").await.status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            create(&app, &token, "short@example.org", "abc").await.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            create(&app, &token, "not-an-email", "password-3").await.status(),
            StatusCode::BAD_REQUEST
        );

        let (status, _) = body_json(
            send(&app, Method::DELETE, "/api/admins/delete?id=9999", Some(&token), None).await,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = body_json(
            send(&app, Method::DELETE, "/api/admins/delete", Some(&token), None).await,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_super_admin_record_is_protected() {
        let state = state().await;
        let app = app(&state);
        let token = token_for(&state, SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD).await;

        let (_, body) = body_json(
            send(
                &app,
                Method::POST,
                "/api/admins/create",
                Some(&token),
                Some(json!({"email": SUPER_ADMIN_EMAIL, "password": "stored-pass-1"})),
            )
            .await,
        )
        .await;
        let id = body["admin"]["id"].as_i64().unwrap();

        let (status, _) = body_json(
            send(
                &app,
                Method::DELETE,
                &format!("/api/admins/delete?id={id}"),
                Some(&token),
                None,
            )
            .await,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = body_json(
            send(
                &app,
                Method::PATCH,
                "/api/admins/update-password",
                Some(&token),
                Some(json!({"id": id, "password": "takeover-pass"})),
            )
            .await,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) =
            body_json(send(&app, Method::GET, "/api/admins/list", Some(&token), None).await).await;
        assert_eq!(body["admins"].as_array().unwrap().len(), 1);
    }
}
