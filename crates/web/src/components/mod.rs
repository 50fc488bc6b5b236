//! Reusable view models shared by several templates.

pub mod data_table;
pub mod navbar;

pub use data_table::{FilterOption, TableColumn, age_filter_options, employee_columns};
pub use navbar::NavbarView;
