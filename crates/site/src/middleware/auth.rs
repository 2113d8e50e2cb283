//! Authentication extractors and the console route guard.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::session::{removal_cookie, set_cookie_header, token_from_headers};
use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Login page of the admin console; reachable without a session.
pub const CONSOLE_LOGIN_PATH: &str = "/admin/login";

fn unauthorized() -> AppError {
    AppError::Unauthorized("Unauthorized".to_string())
}

/// Verify the request's session token, if any.
fn current_admin(parts: &Parts, state: &AppState) -> Option<CurrentAdmin> {
    let token = token_from_headers(&parts.headers)?;
    match state.auth().verify(&token) {
        Ok(admin) => Some(admin),
        Err(e) => {
            tracing::debug!(error = %e, "Session rejected");
            None
        }
    }
}

/// Extractor that requires a valid admin session.
///
/// Rejects with 401 `{"error": "Unauthorized"}` for a missing, forged or
/// expired token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts, state).ok_or_else(unauthorized)?;
        set_sentry_user(&admin.subject_id(), admin.email.as_str());
        Ok(Self(admin))
    }
}

/// Extractor that requires the super admin.
///
/// Rejects with 401 without a valid session and 403 for any other admin.
pub struct RequireSuperAdmin(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAdminAuth(admin) = RequireAdminAuth::from_request_parts(parts, state).await?;

        if !state.auth().policy().is_super_admin(admin.email.as_str()) {
            tracing::info!(email = %admin.email, "Super admin access denied");
            return Err(AppError::Forbidden(
                "Only the super admin can manage admin accounts".to_string(),
            ));
        }

        Ok(Self(admin))
    }
}

/// Guard for the static admin console.
///
/// Everything under `/admin` except the login page and its assets needs a
/// valid session cookie. Otherwise the browser is sent to the login page
/// with the session cookie cleared.
pub async fn console_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if is_public_console_path(request.uri().path()) {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    if current_admin(&parts, &state).is_some() {
        return next.run(Request::from_parts(parts, body)).await;
    }

    let mut response = Redirect::to(CONSOLE_LOGIN_PATH).into_response();
    if let Some(value) = set_cookie_header(&removal_cookie(state.secure_cookies())) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

fn is_public_console_path(path: &str) -> bool {
    !(path == "/admin" || path.starts_with("/admin/"))
        || path == CONSOLE_LOGIN_PATH
        || path
            .strip_prefix(CONSOLE_LOGIN_PATH)
            .is_some_and(|rest| rest.starts_with('/'))
}
