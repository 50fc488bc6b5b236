//! Authentication extractor for protected routes.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, SessionContext};

/// Extractor that requires a signed-in user.
///
/// If no token is stored in the session, HTML requests are redirected to
/// the login page and API requests get 401 Unauthorized. The check runs on
/// every request; nothing is cached.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireSession(user): RequireSession,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name())
/// }
/// ```
pub struct RequireSession(pub CurrentUser);

/// Error returned when a session is required but absent.
#[derive(Debug)]
pub enum SessionRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let rejection = if parts.uri.path().starts_with("/api/") {
            SessionRejection::Unauthorized
        } else {
            SessionRejection::RedirectToLogin
        };

        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(SessionRejection::Unauthorized)?;

        let user = SessionContext::new(session)
            .current_user()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to read session");
                SessionRejection::RedirectToLogin
            })?
            .ok_or(rejection)?;

        Ok(Self(user))
    }
}
