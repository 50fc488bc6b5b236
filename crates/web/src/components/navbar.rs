//! Navigation bar view model.

use crate::models::CurrentUser;

/// Data rendered by `partials/navbar.html`.
///
/// Only built for signed-in users; pages without a session render no navbar.
#[derive(Debug, Clone)]
pub struct NavbarView {
    pub user_name: String,
    pub initial: String,
    pub picture: Option<String>,
    pub is_admin: bool,
    pub current_path: String,
}

impl NavbarView {
    #[must_use]
    pub fn new(user: &CurrentUser, current_path: &str) -> Self {
        Self {
            user_name: user.display_name().to_string(),
            initial: user.initial(),
            picture: user.picture.clone(),
            is_admin: user.role.is_admin(),
            current_path: current_path.to_string(),
        }
    }

    /// Whether the link to `path` is the current page.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        self.current_path == path
    }
}
