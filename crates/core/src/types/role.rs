//! User roles and the actions they permit.

use serde::{Deserialize, Serialize};

/// Role assigned to a signed-in user.
///
/// Stored in the session as `"admin"` or `"user"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// May create, update and delete employees.
    Admin,
    /// Read-only access to the directory.
    #[default]
    User,
}

/// A directory operation that is gated on the user's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Show the create form and submit new employees.
    AddEmployee,
    /// Load a record into the form and submit updates.
    EditEmployee,
    /// Remove a record.
    DeleteEmployee,
}

impl UserRole {
    /// Whether this role may perform `action`.
    ///
    /// This gates what the frontend renders and forwards. The backend still
    /// authorizes every mutating call on its own.
    #[must_use]
    pub const fn can(self, action: Action) -> bool {
        match (self, action) {
            (Self::Admin, Action::AddEmployee | Action::EditEmployee | Action::DeleteEmployee) => {
                true
            }
            (Self::User, _) => false,
        }
    }

    /// Returns `true` for [`UserRole::Admin`].
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Session/storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ALL_ACTIONS: [Action; 3] = [
        Action::AddEmployee,
        Action::EditEmployee,
        Action::DeleteEmployee,
    ];

    #[test]
    fn test_admin_can_do_everything() {
        for action in ALL_ACTIONS {
            assert!(UserRole::Admin.can(action), "{action:?}");
        }
    }

    #[test]
    fn test_user_is_read_only() {
        for action in ALL_ACTIONS {
            assert!(!UserRole::User.can(action), "{action:?}");
        }
    }

    #[test]
    fn test_role_string_roundtrip() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("user".parse::<UserRole>().unwrap(), UserRole::User);
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_default_role_is_user() {
        assert_eq!(UserRole::default(), UserRole::User);
    }
}
