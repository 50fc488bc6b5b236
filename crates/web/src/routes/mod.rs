//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Directory if signed in, else login page
//!
//! # Auth (Google Identity Services, redirect mode)
//! GET  /login?mode=admin|user     - Login page
//! POST /login?mode=admin|user     - Google callback (credential, g_csrf_token)
//! GET  /logout                    - Logout confirmation
//! POST /logout                    - Delete session
//!
//! # Directory (signed-in users; mutations are admin only)
//! GET  /employees?search=&filter= - List with search and age filter
//! POST /employees                 - Create (multipart)
//! POST /employees/draft/clear     - Reset the form
//! POST /employees/{id}            - Update (multipart)
//! GET  /employees/{id}/edit       - Load a record into the form
//! GET  /employees/{id}/delete     - Delete confirmation
//! POST /employees/{id}/delete     - Delete
//! ```

pub mod auth;
pub mod employees;

use axum::Router;

use crate::state::AppState;

/// Build the application router (without middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(employees::router())
}
