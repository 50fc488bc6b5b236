//! One-shot user messages carried across a redirect.

use serde::{Deserialize, Serialize};

/// Severity of an [`Alert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Success,
    Error,
}

/// A message queued in the session and shown once on the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Error,
            message: message.into(),
        }
    }

    /// CSS modifier used by `partials/alerts.html`.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.level {
            AlertLevel::Success => "alert-success",
            AlertLevel::Error => "alert-error",
        }
    }

    /// Message lines. Validation failures carry one violation per line.
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        self.message
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_split_multi_line_messages() {
        let alert = Alert::error("Employee ID is required\nRole is required\n");
        assert_eq!(alert.lines(), vec!["Employee ID is required", "Role is required"]);
        assert_eq!(alert.css_class(), "alert-error");
    }

    #[test]
    fn test_success_alert() {
        let alert = Alert::success("Welcome Ann!");
        assert_eq!(alert.level, AlertLevel::Success);
        assert_eq!(alert.lines(), vec!["Welcome Ann!"]);
    }
}
