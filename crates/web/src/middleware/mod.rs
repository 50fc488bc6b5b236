//! HTTP middleware for the directory.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with in-memory store)
//! 4. Body limit (profile uploads)
//! 5. Route guard (`RequireSession` extractor on protected handlers)

pub mod auth;
pub mod session;

pub use auth::{RequireSession, SessionRejection};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
