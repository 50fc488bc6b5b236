//! Employee backend wire types.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use employee_directory_core::{EmployeeUpdate, NewEmployee, PendingImage};

/// Response envelope used by every backend endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Multipart body for `POST /api/employees`.
pub(crate) fn create_form(employee: &NewEmployee) -> Result<Form, reqwest::Error> {
    let form = Form::new()
        .text("employeeId", employee.employee_id.clone())
        .text("firstName", employee.first_name.clone())
        .text("lastName", employee.last_name.clone())
        .text("age", employee.age.to_string())
        .text("role", employee.role.clone())
        .text("contact", employee.contact.clone());
    with_profile(form, employee.image.as_ref())
}

/// Multipart body for `PUT /api/employees/{id}`.
pub(crate) fn update_form(update: &EmployeeUpdate) -> Result<Form, reqwest::Error> {
    let form = Form::new()
        .text("firstName", update.first_name.clone())
        .text("lastName", update.last_name.clone())
        .text("age", update.age.clone())
        .text("role", update.role.clone())
        .text("contact", update.contact.clone());
    with_profile(form, update.image.as_ref())
}

fn with_profile(form: Form, image: Option<&PendingImage>) -> Result<Form, reqwest::Error> {
    let Some(image) = image else {
        return Ok(form);
    };
    let part = Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)?;
    Ok(form.part("profile", part))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shapes() {
        let ok: ApiEnvelope<Vec<serde_json::Value>> =
            serde_json::from_str(r#"{"success":true,"data":[{"_id":"1"}]}"#).unwrap();
        assert!(ok.success);
        assert_eq!(ok.data.unwrap().len(), 1);

        let err: ApiEnvelope<serde::de::IgnoredAny> =
            serde_json::from_str(r#"{"success":false,"error":"Employee ID already exists"}"#)
                .unwrap();
        assert!(!err.success);
        assert_eq!(err.error.as_deref(), Some("Employee ID already exists"));
    }

    #[test]
    fn test_forms_build_with_and_without_image() {
        let new = NewEmployee {
            employee_id: "E1".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            age: 30,
            role: "eng".to_string(),
            contact: String::new(),
            image: None,
        };
        assert!(create_form(&new).is_ok());

        let update = EmployeeUpdate {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            age: "31".to_string(),
            role: "eng".to_string(),
            contact: String::new(),
            image: Some(PendingImage::new("a.png", "image/png", vec![1, 2, 3]).unwrap()),
        };
        assert!(update_form(&update).is_ok());
    }
}
