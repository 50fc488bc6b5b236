//! Identity gate error types.

use thiserror::Error;

use employee_directory_core::EmailError;

/// Errors that can occur while turning a Google credential into a session.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The credential is not a three-part JWT with a JSON payload.
    #[error("Malformed identity token: {0}")]
    MalformedToken(String),

    /// The token carries no `email` claim.
    #[error("Identity token has no email claim")]
    MissingEmail,

    /// The `email` claim is not a usable address.
    #[error("Invalid email claim: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Admin login requested by an address outside the allow-list.
    #[error("You are not authorized as an admin")]
    NotAuthorizedAdmin,

    /// The `g_csrf_token` form field does not match its cookie.
    #[error("CSRF token mismatch")]
    CsrfMismatch,
}

impl IdentityError {
    /// Message shown on the login page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthorizedAdmin => self.to_string(),
            _ => "Login failed. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            IdentityError::NotAuthorizedAdmin.user_message(),
            "You are not authorized as an admin"
        );
        assert_eq!(
            IdentityError::MissingEmail.user_message(),
            "Login failed. Please try again."
        );
        assert_eq!(
            IdentityError::MalformedToken("bad".to_string()).user_message(),
            "Login failed. Please try again."
        );
    }
}
