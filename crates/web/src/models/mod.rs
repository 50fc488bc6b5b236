//! Session-backed models.

pub mod alert;
pub mod session;

pub use alert::{Alert, AlertLevel};
pub use session::{CurrentUser, SessionContext, keys as session_keys};
