//! Employee Directory Core - Shared domain library.
//!
//! This crate provides the domain logic of the employee directory frontend:
//! - [`employee`] - The employee record as served by the backend
//! - [`draft`] - The unsaved create/update form and its validation rules
//! - [`filter`] - Search and age-category filtering of the loaded list
//! - [`types`] - Newtypes for emails, record IDs and user roles
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no session access. Everything here can be tested without a
//! running server or backend.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod draft;
pub mod employee;
pub mod filter;
pub mod types;

pub use draft::{
    DraftFields, EmployeeDraft, EmployeeUpdate, NewEmployee, PendingImage, ValidationError,
    Violation,
};
pub use employee::Employee;
pub use filter::{AgeCategory, EmployeeFilter, SENIOR_AGE_THRESHOLD};
pub use types::*;
