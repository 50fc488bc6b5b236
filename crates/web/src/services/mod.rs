//! External collaborators: Google sign-in and the employee backend.

pub mod employees;
pub mod identity;

pub use employees::{EmployeeApiClient, EmployeeApiError, Operation};
pub use identity::{AdminAllowList, IdentityError, IdentityGate, LoginIntent};
