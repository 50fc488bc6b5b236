//! The unsaved employee form and its validation.
//!
//! A draft outlives a single request: it is kept when a submission fails so
//! the user can correct it, and reset after a successful save or update.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::employee::{Employee, resolve_image_url};
use crate::types::EmployeeRecordId;

/// A rule broken by a draft submitted for creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Violation {
    #[error("Employee ID is required")]
    MissingEmployeeId,
    #[error("First Name is required")]
    MissingFirstName,
    #[error("Last Name is required")]
    MissingLastName,
    #[error("Valid Age is required")]
    InvalidAge,
    #[error("Role is required")]
    MissingRole,
    #[error("Profile image must be an image file")]
    UnsupportedImage,
}

/// Every violation found in one submission.
///
/// Displays as one message per line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_lines(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    /// Wrap a non-empty list of violations.
    #[must_use]
    pub const fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// The violations, in form order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

fn join_lines(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// An uploaded profile image waiting to be sent with the next submission.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingImage {
    pub file_name: String,
    pub content_type: String,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PendingImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl PendingImage {
    /// Accept an upload if its content type is `image/*`.
    ///
    /// # Errors
    ///
    /// Returns [`Violation::UnsupportedImage`] for any other content type.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, Violation> {
        let content_type = content_type.into();
        if !content_type.to_ascii_lowercase().starts_with("image/") {
            return Err(Violation::UnsupportedImage);
        }
        Ok(Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        })
    }

    /// `data:` URL for previewing the image before it is uploaded.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Text fields as submitted by the employee form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftFields {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub role: String,
    pub contact: String,
}

/// Form state for creating or updating an employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDraft {
    /// Set when the draft edits an existing record.
    pub record_id: Option<EmployeeRecordId>,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Raw age text; only checked when creating.
    pub age: String,
    pub role: String,
    pub contact: String,
    /// Newly chosen image, not yet uploaded.
    pub pending_image: Option<PendingImage>,
    /// Image already stored on the backend for the edited record.
    pub existing_image: Option<String>,
}

/// A validated employee ready to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub role: String,
    pub contact: String,
    pub image: Option<PendingImage>,
}

/// Changes to an existing employee. `employeeId` is not updatable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeUpdate {
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub role: String,
    pub contact: String,
    pub image: Option<PendingImage>,
}

impl EmployeeDraft {
    /// Populate a draft from a loaded record for editing.
    #[must_use]
    pub fn for_update(employee: &Employee) -> Self {
        Self {
            record_id: Some(employee.record_id.clone()),
            employee_id: employee.employee_id.clone(),
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            age: employee.age.map(|a| a.to_string()).unwrap_or_default(),
            role: employee.role.clone(),
            contact: employee.contact.clone().unwrap_or_default(),
            pending_image: None,
            existing_image: employee.profile.clone().filter(|p| !p.trim().is_empty()),
        }
    }

    /// Whether the draft targets an existing record.
    #[must_use]
    pub const fn is_update(&self) -> bool {
        self.record_id.is_some()
    }

    /// Overwrite the text fields with a form submission.
    pub fn apply_fields(&mut self, fields: DraftFields) {
        let DraftFields {
            employee_id,
            first_name,
            last_name,
            age,
            role,
            contact,
        } = fields;
        // Update mode renders employeeId read-only; keep the loaded value.
        if !self.is_update() {
            self.employee_id = employee_id;
        }
        self.first_name = first_name;
        self.last_name = last_name;
        self.age = age;
        self.role = role;
        self.contact = contact;
    }

    /// Replace the pending image.
    pub fn attach_image(&mut self, image: PendingImage) {
        self.pending_image = Some(image);
    }

    /// Image to preview: the pending upload, else the stored one resolved
    /// against `backend_base`.
    #[must_use]
    pub fn preview_src(&self, backend_base: &str) -> Option<String> {
        if let Some(image) = &self.pending_image {
            return Some(image.data_url());
        }
        resolve_image_url(self.existing_image.as_deref()?, backend_base)
    }

    /// Check every creation rule and collect all violations.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing each violated rule, in form
    /// order, when any required field is blank or the age is not a positive
    /// integer.
    pub fn validate_for_create(&self) -> Result<NewEmployee, ValidationError> {
        let mut violations = Vec::new();
        if is_blank(&self.employee_id) {
            violations.push(Violation::MissingEmployeeId);
        }
        if is_blank(&self.first_name) {
            violations.push(Violation::MissingFirstName);
        }
        if is_blank(&self.last_name) {
            violations.push(Violation::MissingLastName);
        }
        let age = parse_positive_age(&self.age);
        if age.is_none() {
            violations.push(Violation::InvalidAge);
        }
        if is_blank(&self.role) {
            violations.push(Violation::MissingRole);
        }

        match age {
            Some(age) if violations.is_empty() => Ok(NewEmployee {
                employee_id: self.employee_id.trim().to_owned(),
                first_name: self.first_name.trim().to_owned(),
                last_name: self.last_name.trim().to_owned(),
                age,
                role: self.role.trim().to_owned(),
                contact: self.contact.trim().to_owned(),
                image: self.pending_image.clone(),
            }),
            _ => Err(ValidationError::new(violations)),
        }
    }

    /// Build the update payload. No required-field checks are applied.
    #[must_use]
    pub fn to_update(&self) -> EmployeeUpdate {
        EmployeeUpdate {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age: self.age.clone(),
            role: self.role.clone(),
            contact: self.contact.clone(),
            image: self.pending_image.clone(),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn parse_positive_age(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|age| *age > 0)
}
