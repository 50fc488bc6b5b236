//! Authentication route handlers.
//!
//! Login uses Google Identity Services in redirect mode: the login page
//! renders Google's button with `login_uri` pointing back at `POST /login`,
//! carrying the chosen intent in the `mode` query parameter.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tower_sessions::cookie::Cookie;
use tracing::instrument;

use crate::components::NavbarView;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::RequireSession;
use crate::models::{Alert, SessionContext};
use crate::services::identity::{CSRF_COOKIE_NAME, IdentityError, LoginIntent, verify_csrf};
use crate::state::AppState;

// =============================================================================
// Form & Query Types
// =============================================================================

/// Query parameters of the login page and callback.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub mode: Option<String>,
    pub error: Option<String>,
}

/// Fields posted by Google Identity Services.
#[derive(Debug, Deserialize)]
pub struct GoogleCallbackForm {
    pub credential: Option<String>,
    pub g_csrf_token: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub intent: LoginIntent,
    pub google_client_id: String,
    pub login_uri: String,
    pub error: Option<String>,
}

/// Logout confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/logout.html")]
pub struct LogoutTemplate {
    pub navbar: NavbarView,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page).post(login_callback))
        .route("/logout", get(logout_page).post(logout))
}

fn login_template(state: &AppState, intent: LoginIntent, error: Option<String>) -> LoginTemplate {
    LoginTemplate {
        intent,
        google_client_id: state.config().google_client_id.clone(),
        login_uri: state.config().login_uri(intent.as_str()),
        error,
    }
}

fn login_redirect(intent: LoginIntent, error: &str) -> Redirect {
    let error: String = url::form_urlencoded::byte_serialize(error.as_bytes()).collect();
    Redirect::to(&format!("/login?mode={}&error={error}", intent.as_str()))
}

/// Read a cookie value from the request headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

// =============================================================================
// Routes
// =============================================================================

/// Landing page: the directory when signed in, otherwise the login page.
///
/// GET /
#[instrument(skip_all)]
async fn index(State(state): State<AppState>, ctx: SessionContext) -> Result<Response, AppError> {
    if ctx.current_user().await?.is_some() {
        return Ok(Redirect::to("/employees").into_response());
    }
    Ok(login_template(&state, LoginIntent::User, None).into_response())
}

/// Render the login page.
///
/// GET /login?mode=admin|user
async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    let intent = LoginIntent::from_mode(query.mode.as_deref());
    login_template(&state, intent, query.error)
}

/// Google Identity Services callback.
///
/// POST /login?mode=admin|user
///
/// A CSRF mismatch is rejected outright. Any other failure returns to the
/// login page with a message and leaves the session untouched.
#[instrument(skip_all, fields(intent = tracing::field::Empty))]
async fn login_callback(
    State(state): State<AppState>,
    ctx: SessionContext,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
    Form(form): Form<GoogleCallbackForm>,
) -> Result<Response, AppError> {
    let intent = LoginIntent::from_mode(query.mode.as_deref());
    tracing::Span::current().record("intent", intent.as_str());

    let csrf_cookie = cookie_value(&headers, CSRF_COOKIE_NAME);
    if let Err(e) = verify_csrf(csrf_cookie.as_deref(), form.g_csrf_token.as_deref()) {
        tracing::warn!(error = %e, "Rejected Google login callback");
        return Err(AppError::BadRequest(e.to_string()));
    }

    let credential = form.credential.unwrap_or_default();
    let user = match state.identity().authenticate(&credential, intent) {
        Ok(user) => user,
        Err(e) => {
            if !matches!(e, IdentityError::NotAuthorizedAdmin) {
                tracing::warn!(error = %e, "Google login failed");
            }
            return Ok(login_redirect(intent, &e.user_message()).into_response());
        }
    };

    ctx.establish(&user).await?;
    ctx.push_alert(Alert::success(user.welcome_message())).await?;
    set_sentry_user(user.email.as_str(), user.role.as_str());
    tracing::info!(email = %user.email, role = %user.role, "User signed in");

    Ok(Redirect::to("/employees").into_response())
}

/// Logout confirmation page.
///
/// GET /logout
async fn logout_page(RequireSession(user): RequireSession) -> impl IntoResponse {
    LogoutTemplate {
        navbar: NavbarView::new(&user, "/logout"),
    }
}

/// Delete the session and return to the login page.
///
/// POST /logout
#[instrument(skip_all)]
async fn logout(ctx: SessionContext) -> Result<Redirect, AppError> {
    ctx.teardown().await?;
    clear_sentry_user();
    tracing::info!("User signed out");
    Ok(Redirect::to("/login"))
}
