//! Client-side filtering of the loaded employee list.
//!
//! The backend has no search endpoint; the full list is fetched and narrowed
//! here on every render. Filtering is pure and deterministic.

use serde::{Deserialize, Serialize};

use crate::employee::Employee;

/// Employees at or above this age are "senior"; below it, "young".
pub const SENIOR_AGE_THRESHOLD: i64 = 25;

/// Age category selected in the filter dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgeCategory {
    /// No age constraint.
    #[default]
    All,
    /// Age below [`SENIOR_AGE_THRESHOLD`].
    Young,
    /// Age at or above [`SENIOR_AGE_THRESHOLD`].
    Senior,
}

impl AgeCategory {
    /// Every category, in dropdown order.
    pub const ALL: [Self; 3] = [Self::All, Self::Young, Self::Senior];

    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Young => "young",
            Self::Senior => "senior",
        }
    }

    /// Dropdown label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All Employees",
            Self::Young => "Age < 25",
            Self::Senior => "Age ≥ 25",
        }
    }

    /// Parse a query-string value, falling back to [`AgeCategory::All`] for
    /// missing or unknown values.
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    /// Whether an employee of the given age belongs to this category.
    ///
    /// An unknown age only satisfies [`AgeCategory::All`].
    #[must_use]
    pub const fn admits(self, age: Option<i64>) -> bool {
        match (self, age) {
            (Self::All, _) => true,
            (Self::Young, Some(age)) => age < SENIOR_AGE_THRESHOLD,
            (Self::Senior, Some(age)) => age >= SENIOR_AGE_THRESHOLD,
            (Self::Young | Self::Senior, None) => false,
        }
    }
}

impl std::fmt::Display for AgeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "young" => Ok(Self::Young),
            "senior" => Ok(Self::Senior),
            _ => Err(format!("invalid age category: {s}")),
        }
    }
}

/// Search term plus age category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmployeeFilter {
    needle: String,
    category: AgeCategory,
}

impl EmployeeFilter {
    /// Build a filter. The search term is matched case-insensitively and
    /// an empty term matches every record.
    #[must_use]
    pub fn new(search: &str, category: AgeCategory) -> Self {
        Self {
            needle: search.to_lowercase(),
            category,
        }
    }

    /// The selected category.
    #[must_use]
    pub const fn category(&self) -> AgeCategory {
        self.category
    }

    /// Whether `employee` is visible under this filter.
    #[must_use]
    pub fn matches(&self, employee: &Employee) -> bool {
        self.matches_search(employee) && self.category.admits(employee.age)
    }

    /// The visible subset of `employees`, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, employees: &'a [Employee]) -> Vec<&'a Employee> {
        employees.iter().filter(|e| self.matches(e)).collect()
    }

    fn matches_search(&self, employee: &Employee) -> bool {
        [&employee.first_name, &employee.last_name, &employee.role]
            .iter()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }
}
