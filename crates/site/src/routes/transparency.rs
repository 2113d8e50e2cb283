//! Public transparency report.

use axum::{Json, Router, extract::State, routing::get};

use crate::error::AppError;
use crate::services::reporting::{self, TransparencyReport};
use crate::state::AppState;

/// Build the transparency router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/transparency/report", get(report))
}

/// Funding, spending and the monthly spending breakdown.
pub async fn report(State(state): State<AppState>) -> Result<Json<TransparencyReport>, AppError> {
    let (donations, expenditures) =
        tokio::try_join!(state.donations().list(), state.expenditures().list())?;

    Ok(Json(reporting::transparency_report(
        &donations,
        &expenditures,
    )))
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
    async fn test_empty_report() {
        let state = state().await;
        let app = app(&state);

        let (status, body) =
            body_json(send(&app, Method::GET, "/api/transparency/report", None, None).await).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_funding"], "0");
        assert_eq!(body["total_expenditure"], "0");
        assert_eq!(body["remaining_balance"], "0");
        assert_eq!(body["monthly_expenditure"], json!([]));
    }

    #[tokio::test]
    async fn test_report_counts_only_verified_funding() {
        let state = state().await;
        let app = app(&state);
        let token = token_for(&state, SUPER_ADMIN_EMAIL, SUPER_ADMIN_PASSWORD).await;

        let (_, verified) = body_json(
            send(
                &app,
                Method::POST,
                "/api/donations/submit",
                None,
                Some(json!({"name": "Asha", "amount": 1000, "transaction_id": "UTR-1"})),
            )
            .await,
        )
        .await;
        send(
            &app,
            Method::POST,
            "/api/donations/submit",
            None,
            Some(json!({"name": "Ravi", "amount": 5000, "transaction_id": "UTR-2"})),
        )
        .await;
        send(
            &app,
            Method::PATCH,
            "/api/donations/status",
            Some(&token),
            Some(json!({"id": verified["id"], "status": "verified"})),
        )
        .await;
        for (amount, date) in [(300, "2024-01-15"), (150, "2024-02-01")] {
            send(
                &app,
                Method::POST,
                "/api/expenditures",
                Some(&token),
                Some(json!({"amount": amount, "reason": "Supplies", "date": date})),
            )
            .await;
        }

        let (_, body) =
            body_json(send(&app, Method::GET, "/api/transparency/report", None, None).await).await;

        assert_eq!(body["total_funding"], "1000");
        assert_eq!(body["total_expenditure"], "450");
        assert_eq!(body["remaining_balance"], "550");
        assert_eq!(
            body["monthly_expenditure"],
            json!([
                {"month_key": "2024-02", "month_label": "February 2024", "total": "150"},
                {"month_key": "2024-01", "month_label": "January 2024", "total": "300"},
            ])
        );
    }
}
