//! Donation submission, lookup and verification.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use serde::Serialize;

use super::ApiJson;
use crate::error::AppError;
use crate::middleware::auth::RequireAdminAuth;
use crate::models::{CheckDonationInput, Donation, SubmitDonationInput, UpdateDonationStatusInput};
use crate::services::DonationService;
use crate::services::reporting::DonationStats;
use crate::state::AppState;

/// Build the donations router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/donations/submit", post(submit))
        .route("/api/donations/check", post(check))
        .route("/api/donations/stats", get(stats))
        .route("/api/donations/list", get(list))
        .route("/api/donations/status", patch(update_status))
        .route("/api/donations/admin-stats", get(admin_stats))
}

/// Result of a transaction lookup.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donation: Option<Donation>,
}

/// Record a donor's submission as pending.
pub async fn submit(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SubmitDonationInput>,
) -> Result<(StatusCode, Json<Donation>), AppError> {
    let donation = DonationService::new(state.donations()).submit(body).await?;
    Ok((StatusCode::CREATED, Json(donation)))
}

/// Check whether a transaction reference is already on the ledger.
pub async fn check(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CheckDonationInput>,
) -> Result<Json<CheckResponse>, AppError> {
    let donation = DonationService::new(state.donations())
        .find_by_transaction_id(&body.transaction_id)
        .await?;

    Ok(Json(CheckResponse {
        exists: donation.is_some(),
        donation,
    }))
}

/// Public ledger statistics.
pub async fn stats(State(state): State<AppState>) -> Result<Json<DonationStats>, AppError> {
    let stats = DonationService::new(state.donations()).stats().await?;
    Ok(Json(stats))
}

/// All donations, newest first.
pub async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Donation>>, AppError> {
    let donations = DonationService::new(state.donations()).list().await?;
    Ok(Json(donations))
}

/// Verify a donation, or return it to pending.
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateDonationStatusInput>,
) -> Result<Json<Donation>, AppError> {
    let donation = DonationService::new(state.donations())
        .set_status(body.id, &body.status)
        .await?;

    tracing::info!(
        donation_id = %donation.id,
        status = %donation.status,
        by = %admin.email,
        "Donation reviewed"
    );
    Ok(Json(donation))
}

/// Ledger statistics for the console.
pub async fn admin_stats(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<DonationStats>, AppError> {
    let stats = DonationService::new(state.donations()).stats().await?;
    Ok(Json(stats))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{Value, json};

    use super::super::test_support::{
        SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD, app, body_json, send, state, token_for,
    };

    async fn submit(app: &axum::Router, body: Value) -> (StatusCode, Value) {
        body_json(send(app, Method::POST, "/api/donations/submit", None, Some(body)).await).await
    }

    #[tokio::test]
    async fn test_submit_then_check() {
        let state = state().await;
        let app = app(&state);

        let (status, body) = submit(
            &app,
            json!({"name": "Asha", "amount": 500, "transaction_id": "UTR-1"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "pending");
        assert!(body["verified_at"].is_null());

        let (status, body) = body_json(
            send(
                &app,
                Method::POST,
                "/api/donations/check",
                None,
                Some(json!({"transaction_id": "UTR-1"})),
            )
            .await,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["exists"], true);
        assert_eq!(body["donation"]["name"], "Asha");

        let (_, body) = body_json(
            send(
                &app,
                Method::POST,
                "/api/donations/check",
                None,
                Some(json!({"transaction_id": "UTR-2"})),
            )
            .await,
        )
        .await;
        assert_eq!(body, json!({"exists": false}));
    }

    #[tokio::test]
    async fn test_submit_rejections() {
        let state = state().await;
        let app = app(&state);

        let (status, _) = submit(
            &app,
            json!({"name": "Asha", "amount": "250.50", "transaction_id": "UTR-9"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = submit(
            &app,
            json!({"name": "Ravi", "amount": 10, "transaction_id": "UTR-9"}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["error"],
            "A donation with this transaction ID already exists"
        );

        for bad in [
            json!({"amount": 10, "transaction_id": "UTR-10"}),
            json!({"name": "Ravi", "amount": 0, "transaction_id": "UTR-11"}),
            json!({"name": "Ravi", "amount": -5, "transaction_id": "UTR-12"}),
            json!({"name": "Ravi", "amount": 5}),
        ] {
            let (status, body) = submit(&app, bad).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_admin_endpoints_require_session() {
        let state = state().await;
        let app = app(&state);

        for (method, uri) in [
            (Method::GET, "/api/donations/list"),
            (Method::GET, "/api/donations/admin-stats"),
        ] {
            let (status, _) = body_json(send(&app, method, uri, None, None).await).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }

        let (status, _) = body_json(
            send(
                &app,
                Method::PATCH,
                "/api/donations/status",
                None,
                Some(json!({"id": 1, "status": "verified"})),
            )
            .await,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_verification_moves_stats() {
        let state = state().await;
        let app = app(&state);
        let token = token_for(&state, SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD).await;

        let (_, created) = submit(
            &app,
            json!({"name": "Asha", "amount": 300, "transaction_id": "UTR-30"}),
        )
        .await;

        let (status, body) = body_json(
            send(
                &app,
                Method::PATCH,
                "/api/donations/status",
                Some(&token),
                Some(json!({"id": created["id"], "status": "verified"})),
            )
            .await,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "verified");
        assert!(body["verified_at"].is_string());

        let (_, stats) =
            body_json(send(&app, Method::GET, "/api/donations/stats", None, None).await).await;
        assert_eq!(stats["verified_donations"], 1);
        assert_eq!(stats["pending_donations"], 0);

        let (_, admin_stats) = body_json(
            send(&app, Method::GET, "/api/donations/admin-stats", Some(&token), None).await,
        )
        .await;
        assert_eq!(stats, admin_stats);

        let (status, _) = body_json(
            send(
                &app,
                Method::PATCH,
                "/api/donations/status",
                Some(&token),
                Some(json!({"id": 999, "status": "verified"})),
            )
            .await,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) =
            body_json(send(&app, Method::GET, "/api/donations/list", Some(&token), None).await)
                .await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }
}
