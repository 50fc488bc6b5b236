//! Data table component types.
//!
//! Column and filter definitions for the employee table.

use employee_directory_core::AgeCategory;

/// Column definition for a data table.
#[derive(Debug, Clone)]
pub struct TableColumn {
    /// Unique key for the column.
    pub key: &'static str,
    /// Display label for the column header.
    pub label: &'static str,
}

impl TableColumn {
    #[must_use]
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Option in a select filter.
#[derive(Debug, Clone)]
pub struct FilterOption {
    /// Query-string value.
    pub value: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Whether this option is currently applied.
    pub selected: bool,
}

/// Columns of the employee table. Actions appear only for editors.
#[must_use]
pub fn employee_columns(show_actions: bool) -> Vec<TableColumn> {
    let mut columns = vec![
        TableColumn::new("index", "#"),
        TableColumn::new("employee_id", "Employee ID"),
        TableColumn::new("name", "Name"),
        TableColumn::new("age", "Age"),
        TableColumn::new("role", "Role"),
        TableColumn::new("contact", "Contact"),
        TableColumn::new("profile", "Profile"),
    ];
    if show_actions {
        columns.push(TableColumn::new("actions", "Actions"));
    }
    columns
}

/// Age category dropdown, with `selected` marked.
#[must_use]
pub fn age_filter_options(selected: AgeCategory) -> Vec<FilterOption> {
    AgeCategory::ALL
        .iter()
        .map(|&category| FilterOption {
            value: category.as_str(),
            label: category.label(),
            selected: category == selected,
        })
        .collect()
}
