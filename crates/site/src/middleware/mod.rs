//! HTTP middleware stack for the site.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (records `request_id` on the span)
//! 4. Security headers
//! 5. Console guard (only on `/admin/**`)
//!
//! Route-level authentication uses the [`RequireAdminAuth`] and
//! [`RequireSuperAdmin`] extractors.

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{CONSOLE_LOGIN_PATH, RequireAdminAuth, RequireSuperAdmin, console_guard};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::{
    SESSION_COOKIE_NAME, removal_cookie, session_cookie, set_cookie_header, token_from_headers,
};
