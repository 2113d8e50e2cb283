//! JSON API route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /api/auth/login               - Exchange credentials for a session
//! GET    /api/auth/whoami              - Current session identity
//! POST   /api/auth/logout              - Clear the session cookie
//!
//! # Admin accounts (super admin only)
//! POST   /api/admins/create            - Create an admin
//! DELETE /api/admins/delete?id=        - Delete an admin
//! GET    /api/admins/list              - List admins
//! PATCH  /api/admins/update-password   - Reset an admin's password
//!
//! # Donations
//! POST   /api/donations/submit         - Public donation submission
//! POST   /api/donations/check          - Public transaction lookup
//! GET    /api/donations/stats          - Public ledger statistics
//! GET    /api/donations/list           - All donations (admin)
//! PATCH  /api/donations/status         - Verify or un-verify (admin)
//! GET    /api/donations/admin-stats    - Ledger statistics (admin)
//!
//! # Expenditures (admin)
//! GET    /api/expenditures             - List
//! POST   /api/expenditures             - Create
//! PATCH  /api/expenditures             - Partial update
//! DELETE /api/expenditures             - Delete
//!
//! # Transparency
//! GET    /api/transparency/report      - Public funding report
//! ```

pub mod admin_users;
pub mod auth;
pub mod donations;
pub mod expenditures;
pub mod transparency;

use axum::{
    Router,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// Build the complete API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(admin_users::router())
        .merge(donations::router())
        .merge(expenditures::router())
        .merge(transparency::router())
}

/// JSON body extractor whose rejections use the API error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the API error shape.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Body for operations that only acknowledge success.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub const fn ok() -> Self {
        Self { ok: true }
    }
}
