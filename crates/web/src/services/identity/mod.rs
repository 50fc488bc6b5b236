//! Google sign-in and role assignment.
//!
//! Google Identity Services posts an ID token (a JWT) to `/login` in
//! redirect mode. The gate reads the token's claims, checks the admin
//! allow-list against the login intent, and produces the [`CurrentUser`]
//! that is written to the session.
//!
//! The token signature is not verified here. The backend receives the same
//! token as its bearer credential and is responsible for trusting it.

mod error;

pub use error::IdentityError;

use std::collections::HashSet;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::SecretString;
use serde::Deserialize;

use employee_directory_core::{Email, UserRole};

use crate::models::CurrentUser;

/// Name of the double-submit CSRF cookie and form field set by Google.
pub const CSRF_COOKIE_NAME: &str = "g_csrf_token";

/// Which kind of access the user asked for on the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginIntent {
    Admin,
    #[default]
    User,
}

impl LoginIntent {
    /// Query-string value (`mode=`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Parse the `mode` query parameter; anything but `admin` is `User`.
    #[must_use]
    pub fn from_mode(mode: Option<&str>) -> Self {
        match mode {
            Some(m) if m.eq_ignore_ascii_case("admin") => Self::Admin,
            _ => Self::User,
        }
    }

    /// The intent the login page's toggle switches to.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Admin => Self::User,
            Self::User => Self::Admin,
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Label of the button that switches to the other intent.
    #[must_use]
    pub const fn switch_label(self) -> &'static str {
        match self {
            Self::Admin => "Switch to User",
            Self::User => "Switch to Admin",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Admin => "Admin Login",
            Self::User => "User Login",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Admin => "Admin (Full Access)",
            Self::User => "User (Read-only)",
        }
    }
}

/// Case-insensitive set of admin email addresses.
#[derive(Debug, Clone, Default)]
pub struct AdminAllowList {
    emails: HashSet<String>,
}

impl AdminAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, email: &Email) -> bool {
        self.emails.contains(&email.normalized())
    }
}

/// Claims read from a Google ID token payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityClaims {
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Decode the claims of a Google ID token without checking its signature.
///
/// Expiry and audience are not checked either; the backend validates the
/// token it receives as the bearer credential.
///
/// # Errors
///
/// Returns [`IdentityError::MalformedToken`] if the token is not a JWT with
/// a JSON claims payload.
pub fn decode_claims(token: &str) -> Result<IdentityClaims, IdentityError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<IdentityClaims>(token.trim(), &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| IdentityError::MalformedToken(e.to_string()))
}

/// Role granted for a login.
///
/// Admin requires both the admin intent and an allow-listed address.
#[must_use]
pub const fn derive_role(intent: LoginIntent, allow_listed: bool) -> UserRole {
    match (intent, allow_listed) {
        (LoginIntent::Admin, true) => UserRole::Admin,
        _ => UserRole::User,
    }
}

/// Check Google's double-submit CSRF token.
///
/// # Errors
///
/// Returns [`IdentityError::CsrfMismatch`] unless both values are present,
/// non-empty and equal.
pub fn verify_csrf(cookie: Option<&str>, form: Option<&str>) -> Result<(), IdentityError> {
    match (cookie, form) {
        (Some(cookie), Some(form)) if !cookie.is_empty() && cookie == form => Ok(()),
        _ => Err(IdentityError::CsrfMismatch),
    }
}

/// Turns a Google credential into a signed-in user.
#[derive(Debug, Clone)]
pub struct IdentityGate {
    allow_list: AdminAllowList,
}

impl IdentityGate {
    #[must_use]
    pub const fn new(allow_list: AdminAllowList) -> Self {
        Self { allow_list }
    }

    /// Validate a credential for the given intent.
    ///
    /// Nothing is written anywhere; the caller establishes the session only
    /// on `Ok`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed or lacks a valid email, or
    /// [`IdentityError::NotAuthorizedAdmin`] for an admin login by an address
    /// outside the allow-list.
    pub fn authenticate(
        &self,
        credential: &str,
        intent: LoginIntent,
    ) -> Result<CurrentUser, IdentityError> {
        let claims = decode_claims(credential)?;
        let email = Email::parse(claims.email.as_deref().ok_or(IdentityError::MissingEmail)?)?;

        let allow_listed = self.allow_list.contains(&email);
        if intent == LoginIntent::Admin && !allow_listed {
            tracing::warn!(email = %email, "Admin login refused: not in allow-list");
            return Err(IdentityError::NotAuthorizedAdmin);
        }

        Ok(CurrentUser {
            token: SecretString::from(credential.trim().to_string()),
            name: claims.name.filter(|n| !n.trim().is_empty()),
            email,
            picture: claims.picture.filter(|p| !p.trim().is_empty()),
            role: derive_role(intent, allow_listed),
        })
    }
}
