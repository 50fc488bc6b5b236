//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::DirectoryConfig;
use crate::services::{AdminAllowList, EmployeeApiClient, EmployeeApiError, IdentityGate};

/// Application state shared across all handlers.
///
/// Immutable after startup; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DirectoryConfig,
    employees: EmployeeApiClient,
    identity: IdentityGate,
}

impl AppState {
    /// Build the state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: DirectoryConfig) -> Result<Self, EmployeeApiError> {
        let employees =
            EmployeeApiClient::new(&config.employee_api_url, config.employee_api_timeout)?;
        let identity = IdentityGate::new(AdminAllowList::new(&config.admin_emails));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                employees,
                identity,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &DirectoryConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn employees(&self) -> &EmployeeApiClient {
        &self.inner.employees
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityGate {
        &self.inner.identity
    }
}
