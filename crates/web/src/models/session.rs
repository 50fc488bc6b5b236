//! Per-browser session state.
//!
//! Everything the directory remembers about a browser lives in its
//! tower-sessions record: the signed-in identity, the unsaved employee form,
//! the last successfully loaded list and any queued alerts.

use axum::{extract::FromRequestParts, http::request::Parts};
use secrecy::{ExposeSecret, SecretString};
use tower_sessions::Session;
use tower_sessions::session::Error as SessionError;

use employee_directory_core::{Email, Employee, EmployeeDraft, UserRole};

use super::alert::Alert;
use crate::error::AppError;

/// Session keys.
pub mod keys {
    /// Bearer token forwarded to the employee backend.
    pub const AUTH_TOKEN: &str = "authToken";
    pub const USER_NAME: &str = "userName";
    pub const USER_EMAIL: &str = "userEmail";
    pub const USER_PICTURE: &str = "userPicture";
    pub const USER_ROLE: &str = "userRole";

    /// Unsaved create/update form.
    pub const EMPLOYEE_DRAFT: &str = "employeeDraft";

    /// Last successfully listed employees.
    pub const EMPLOYEE_SNAPSHOT: &str = "employeeSnapshot";

    /// Alerts waiting to be rendered.
    pub const ALERTS: &str = "alerts";
}

/// The signed-in user.
#[derive(Clone)]
pub struct CurrentUser {
    /// Identity token, sent to the backend as the bearer credential.
    pub token: SecretString,
    pub name: Option<String>,
    pub email: Email,
    pub picture: Option<String>,
    pub role: UserRole,
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("token", &"[REDACTED]")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("picture", &self.picture)
            .field("role", &self.role)
            .finish()
    }
}

impl CurrentUser {
    /// Name shown in the navbar, falling back to "User".
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("User")
    }

    /// Uppercased first letter of [`Self::display_name`].
    #[must_use]
    pub fn initial(&self) -> String {
        self.display_name()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }

    /// Greeting queued after a successful login.
    #[must_use]
    pub fn welcome_message(&self) -> String {
        let prefix = if self.role.is_admin() { "Admin " } else { "" };
        format!("Welcome {prefix}{}!", self.display_name())
    }
}

/// Typed access to the session record.
#[derive(Debug, Clone)]
pub struct SessionContext {
    session: Session,
}

impl SessionContext {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Load the signed-in user.
    ///
    /// Returns `None` unless a non-empty token and an email are stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn current_user(&self) -> Result<Option<CurrentUser>, SessionError> {
        let Some(token) = self
            .session
            .get::<String>(keys::AUTH_TOKEN)
            .await?
            .filter(|t| !t.is_empty())
        else {
            return Ok(None);
        };
        let Some(email) = self.session.get::<Email>(keys::USER_EMAIL).await? else {
            return Ok(None);
        };

        Ok(Some(CurrentUser {
            token: SecretString::from(token),
            name: self.session.get(keys::USER_NAME).await?,
            email,
            picture: self.session.get(keys::USER_PICTURE).await?,
            role: self
                .session
                .get(keys::USER_ROLE)
                .await?
                .unwrap_or_default(),
        }))
    }

    /// Replace whatever the session held with a fresh login.
    ///
    /// The session ID is cycled so a pre-login cookie cannot be reused.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn establish(&self, user: &CurrentUser) -> Result<(), SessionError> {
        self.session.clear().await;
        self.session.cycle_id().await?;

        self.session
            .insert(keys::AUTH_TOKEN, user.token.expose_secret())
            .await?;
        self.session.insert(keys::USER_EMAIL, &user.email).await?;
        self.session.insert(keys::USER_ROLE, user.role).await?;
        // Absent claims stay absent rather than stored as null
        if let Some(name) = &user.name {
            self.session.insert(keys::USER_NAME, name).await?;
        }
        if let Some(picture) = &user.picture {
            self.session.insert(keys::USER_PICTURE, picture).await?;
        }
        Ok(())
    }

    /// Delete the session record and its cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot delete the record.
    pub async fn teardown(&self) -> Result<(), SessionError> {
        self.session.flush().await
    }

    /// The unsaved form, or an empty create-mode draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn draft(&self) -> Result<EmployeeDraft, SessionError> {
        Ok(self
            .session
            .get(keys::EMPLOYEE_DRAFT)
            .await?
            .unwrap_or_default())
    }

    /// Persist the form so it survives a failed submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn save_draft(&self, draft: &EmployeeDraft) -> Result<(), SessionError> {
        self.session.insert(keys::EMPLOYEE_DRAFT, draft).await
    }

    /// Return the form to an empty create-mode draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn reset_draft(&self) -> Result<(), SessionError> {
        self.session.remove_value(keys::EMPLOYEE_DRAFT).await?;
        Ok(())
    }

    /// The last list the backend returned, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn snapshot(&self) -> Result<Vec<Employee>, SessionError> {
        Ok(self
            .session
            .get(keys::EMPLOYEE_SNAPSHOT)
            .await?
            .unwrap_or_default())
    }

    /// Replace the stored list.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn save_snapshot(&self, employees: &[Employee]) -> Result<(), SessionError> {
        self.session.insert(keys::EMPLOYEE_SNAPSHOT, employees).await
    }

    /// Queue an alert for the next rendered page.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read or written.
    pub async fn push_alert(&self, alert: Alert) -> Result<(), SessionError> {
        let mut alerts: Vec<Alert> = self
            .session
            .get(keys::ALERTS)
            .await?
            .unwrap_or_default();
        alerts.push(alert);
        self.session.insert(keys::ALERTS, alerts).await
    }

    /// Remove and return every queued alert.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read or written.
    pub async fn take_alerts(&self) -> Result<Vec<Alert>, SessionError> {
        Ok(self
            .session
            .remove::<Vec<Alert>>(keys::ALERTS)
            .await?
            .unwrap_or_default())
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self::new)
            .ok_or_else(|| AppError::Internal("session layer is not installed".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn context() -> SessionContext {
        SessionContext::new(Session::new(None, Arc::new(MemoryStore::default()), None))
    }

    fn ann(role: UserRole) -> CurrentUser {
        CurrentUser {
            token: SecretString::from("header.payload.sig"),
            name: Some("Ann".to_string()),
            email: Email::parse("ann@example.com").unwrap(),
            picture: None,
            role,
        }
    }

    #[tokio::test]
    async fn test_empty_session_has_no_user() {
        let ctx = context();
        assert!(ctx.current_user().await.unwrap().is_none());
        assert!(ctx.snapshot().await.unwrap().is_empty());
        assert_eq!(ctx.draft().await.unwrap(), EmployeeDraft::default());
    }

    #[tokio::test]
    async fn test_establish_then_load() {
        let ctx = context();
        ctx.establish(&ann(UserRole::Admin)).await.unwrap();

        let user = ctx.current_user().await.unwrap().unwrap();
        assert_eq!(user.token.expose_secret(), "header.payload.sig");
        assert_eq!(user.email.as_str(), "ann@example.com");
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.display_name(), "Ann");
    }

    #[tokio::test]
    async fn test_establish_replaces_previous_state() {
        let ctx = context();
        let draft = EmployeeDraft {
            first_name: "Left over".to_string(),
            ..EmployeeDraft::default()
        };
        ctx.save_draft(&draft).await.unwrap();
        ctx.push_alert(Alert::error("stale")).await.unwrap();

        ctx.establish(&ann(UserRole::User)).await.unwrap();
        assert_eq!(ctx.draft().await.unwrap(), EmployeeDraft::default());
        assert!(ctx.take_alerts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_token_is_not_a_session() {
        let ctx = context();
        ctx.establish(&CurrentUser {
            token: SecretString::from(""),
            ..ann(UserRole::User)
        })
        .await
        .unwrap();
        assert!(ctx.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_alerts_are_taken_once() {
        let ctx = context();
        ctx.push_alert(Alert::success("one")).await.unwrap();
        ctx.push_alert(Alert::error("two")).await.unwrap();

        let alerts = ctx.take_alerts().await.unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].message, "one");
        assert!(ctx.take_alerts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_draft() {
        let ctx = context();
        let draft = EmployeeDraft {
            employee_id: "E1".to_string(),
            ..EmployeeDraft::default()
        };
        ctx.save_draft(&draft).await.unwrap();
        assert_eq!(ctx.draft().await.unwrap().employee_id, "E1");

        ctx.reset_draft().await.unwrap();
        assert_eq!(ctx.draft().await.unwrap(), EmployeeDraft::default());
    }

    #[test]
    fn test_display_name_and_welcome() {
        let admin = ann(UserRole::Admin);
        assert_eq!(admin.welcome_message(), "Welcome Admin Ann!");
        assert_eq!(admin.initial(), "A");

        let nameless = CurrentUser {
            name: None,
            ..ann(UserRole::User)
        };
        assert_eq!(nameless.display_name(), "User");
        assert_eq!(nameless.welcome_message(), "Welcome User!");
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", ann(UserRole::User));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("header.payload.sig"));
    }
}
