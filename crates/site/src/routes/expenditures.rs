//! Expenditure ledger maintenance (admin only).

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tracing::instrument;

use super::{ApiJson, OkResponse};
use crate::error::AppError;
use crate::middleware::auth::RequireAdminAuth;
use crate::models::{
    CreateExpenditureInput, DeleteExpenditureInput, Expenditure, UpdateExpenditureInput,
};
use crate::services::ExpenditureService;
use crate::state::AppState;

/// Build the expenditures router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/expenditures",
        get(list_expenditures)
            .post(create_expenditure)
            .patch(update_expenditure)
            .delete(delete_expenditure),
    )
}

/// All expenditures, newest date first.
pub async fn list_expenditures(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Expenditure>>, AppError> {
    let expenditures = ExpenditureService::new(state.expenditures()).list().await?;
    Ok(Json(expenditures))
}

/// Record an expenditure.
#[instrument(skip_all, fields(by = %admin.email))]
pub async fn create_expenditure(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateExpenditureInput>,
) -> Result<(StatusCode, Json<Expenditure>), AppError> {
    let expenditure = ExpenditureService::new(state.expenditures())
        .create(body)
        .await?;
    Ok((StatusCode::CREATED, Json(expenditure)))
}

/// Patch the fields present in the body.
#[instrument(skip_all, fields(by = %admin.email, expenditure_id = %body.id))]
pub async fn update_expenditure(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateExpenditureInput>,
) -> Result<Json<Expenditure>, AppError> {
    let expenditure = ExpenditureService::new(state.expenditures())
        .update(body)
        .await?;
    Ok(Json(expenditure))
}

/// Remove an expenditure.
#[instrument(skip_all, fields(by = %admin.email, expenditure_id = %body.id))]
pub async fn delete_expenditure(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DeleteExpenditureInput>,
) -> Result<Json<OkResponse>, AppError> {
    ExpenditureService::new(state.expenditures())
        .delete(body.id)
        .await?;
    Ok(Json(OkResponse::ok()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{Value, json};

    use super::super::test_support::{
        SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD, app, body_json, send, state, token_for,
    };

    async fn call(
        app: &axum::Router,
        method: Method,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        body_json(send(app, method, "/api/expenditures", token, body).await).await
    }

    #[tokio::test]
    async fn test_requires_session() {
        let state = state().await;
        let app = app(&state);

        let (status, body) = call(&app, Method::GET, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let (status, _) = call(
            &app,
            Method::POST,
            None,
            Some(json!({"amount": 10, "reason": "Rent", "date": "2024-01-01"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_crud_lifecycle() {
        let state = state().await;
        let app = app(&state);
        let token = token_for(&state, SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD).await;
        let token = Some(token.as_str());

        let (status, created) = call(
            &app,
            Method::POST,
            token,
            Some(json!({"amount": "300.00", "reason": "Rent", "date": "2024-01-15"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["date"], "2024-01-15");
        let id = created["id"].clone();

        let (status, patched) = call(
            &app,
            Method::PATCH,
            token,
            Some(json!({"id": id, "reason": "Office rent"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["reason"], "Office rent");
        assert_eq!(patched["amount"], created["amount"]);

        let (status, unchanged) =
            call(&app, Method::PATCH, token, Some(json!({"id": id}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(unchanged, patched);

        let (status, _) = call(
            &app,
            Method::PATCH,
            token,
            Some(json!({"id": id, "date": "not a date"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, list) = call(&app, Method::GET, token, None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, body) = call(&app, Method::DELETE, token, Some(json!({"id": id}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));

        let (status, _) = call(&app, Method::DELETE, token, Some(json!({"id": id}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, Method::PATCH, token, Some(json!({"id": id}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let state = state().await;
        let app = app(&state);
        let token = token_for(&state, SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD).await;

        for bad in [
            json!({"reason": "Rent", "date": "2024-01-01"}),
            json!({"amount": -1, "reason": "Rent", "date": "2024-01-01"}),
            json!({"amount": 10, "reason": "", "date": "2024-01-01"}),
            json!({"amount": 10, "reason": "Rent"}),
        ] {
            let (status, body) = call(&app, Method::POST, Some(&token), Some(bad)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].is_string());
        }
    }
}
