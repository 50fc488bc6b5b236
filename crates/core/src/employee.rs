//! The employee record as owned by the backend.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::EmployeeRecordId;

/// An employee as returned by `GET /api/employees`.
///
/// Records come straight from the backend and are never re-validated on the
/// client, so `age` is `None` whenever the stored value is not a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Backend-assigned document ID.
    #[serde(rename = "_id")]
    pub record_id: EmployeeRecordId,
    /// User-supplied business identifier.
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Age in years, if the backend holds an integer-like value.
    #[serde(default, deserialize_with = "deserialize_lenient_age")]
    pub age: Option<i64>,
    /// Job role (free text, unrelated to [`crate::UserRole`]).
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub contact: Option<String>,
    /// Path or URL of the uploaded profile image.
    #[serde(default)]
    pub profile: Option<String>,
}

impl Employee {
    /// "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Uppercased first letter of the first name, used for the avatar
    /// placeholder when there is no profile image.
    #[must_use]
    pub fn initial(&self) -> String {
        self.first_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }

    /// Contact text with empty values treated as absent.
    #[must_use]
    pub fn contact(&self) -> Option<&str> {
        self.contact.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Absolute URL of the profile image.
    ///
    /// The backend stores upload paths such as `/uploads/abc.png`; see
    /// [`resolve_image_url`].
    #[must_use]
    pub fn profile_url(&self, backend_base: &str) -> Option<String> {
        resolve_image_url(self.profile.as_deref()?, backend_base)
    }
}

/// Resolve a stored image path against `backend_base`.
///
/// Absolute `http(s)` URLs are returned as-is; blank values are `None`.
#[must_use]
pub fn resolve_image_url(stored: &str, backend_base: &str) -> Option<String> {
    let stored = stored.trim();
    if stored.is_empty() {
        return None;
    }
    if stored.starts_with("http://") || stored.starts_with("https://") {
        return Some(stored.to_owned());
    }
    Some(format!(
        "{}/{}",
        backend_base.trim_end_matches('/'),
        stored.trim_start_matches('/')
    ))
}

/// Accept numbers, numeric strings, or anything else (as `None`).
#[allow(clippy::cast_possible_truncation)] // ages are small; fractional part is dropped
fn deserialize_lenient_age<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAge {
        Int(i64),
        Float(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<RawAge>::deserialize(deserializer)? {
        Some(RawAge::Int(n)) => Some(n),
        Some(RawAge::Float(f)) if f.is_finite() => Some(f.trunc() as i64),
        Some(RawAge::Text(s)) => s.trim().parse().ok(),
        Some(RawAge::Float(_) | RawAge::Other(_)) | None => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Employee {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_deserialize_backend_shape() {
        let emp = parse(
            r#"{"_id":"65f0","employeeId":"E1","firstName":"Ann","lastName":"Lee",
                "age":30,"role":"eng","contact":"555-0100","profile":"/uploads/ann.png","__v":0}"#,
        );
        assert_eq!(emp.record_id.as_str(), "65f0");
        assert_eq!(emp.employee_id, "E1");
        assert_eq!(emp.full_name(), "Ann Lee");
        assert_eq!(emp.age, Some(30));
        assert_eq!(emp.contact(), Some("555-0100"));
        assert_eq!(emp.profile.as_deref(), Some("/uploads/ann.png"));
    }

    #[test]
    fn test_age_accepts_numeric_strings() {
        let emp = parse(r#"{"_id":"1","firstName":"Bo","lastName":"K","age":" 42 ","role":"ops"}"#);
        assert_eq!(emp.age, Some(42));
    }

    #[test]
    fn test_age_non_numeric_is_unknown() {
        let emp = parse(r#"{"_id":"1","firstName":"Bo","lastName":"K","age":"old","role":"ops"}"#);
        assert_eq!(emp.age, None);

        let emp = parse(r#"{"_id":"1","firstName":"Bo","lastName":"K","age":null,"role":"ops"}"#);
        assert_eq!(emp.age, None);

        let emp = parse(r#"{"_id":"1","firstName":"Bo","lastName":"K","age":[1],"role":"ops"}"#);
        assert_eq!(emp.age, None);
    }

    #[test]
    fn test_age_missing_and_float() {
        let emp = parse(r#"{"_id":"1","firstName":"Bo","lastName":"K","role":"ops"}"#);
        assert_eq!(emp.age, None);

        let emp = parse(r#"{"_id":"1","firstName":"Bo","lastName":"K","age":24.9,"role":"ops"}"#);
        assert_eq!(emp.age, Some(24));
    }

    #[test]
    fn test_snapshot_roundtrip_keeps_age() {
        let emp = parse(r#"{"_id":"1","firstName":"Bo","lastName":"K","age":"31","role":"ops"}"#);
        let stored = serde_json::to_value(&emp).unwrap();
        let restored: Employee = serde_json::from_value(stored).unwrap();
        assert_eq!(restored, emp);
    }

    #[test]
    fn test_initial() {
        let emp = parse(r#"{"_id":"1","firstName":"élodie","lastName":"K","role":"ops"}"#);
        assert_eq!(emp.initial(), "É");

        let emp = parse(r#"{"_id":"1","firstName":"","lastName":"K","role":"ops"}"#);
        assert_eq!(emp.initial(), "");
    }

    #[test]
    fn test_profile_url_resolution() {
        let mut emp = parse(r#"{"_id":"1","firstName":"Bo","lastName":"K","role":"ops"}"#);
        assert_eq!(emp.profile_url("http://api.local"), None);

        emp.profile = Some("/uploads/bo.png".to_string());
        assert_eq!(
            emp.profile_url("http://api.local/").as_deref(),
            Some("http://api.local/uploads/bo.png")
        );

        emp.profile = Some("https://cdn.example.com/bo.png".to_string());
        assert_eq!(
            emp.profile_url("http://api.local").as_deref(),
            Some("https://cdn.example.com/bo.png")
        );

        emp.profile = Some("   ".to_string());
        assert_eq!(emp.profile_url("http://api.local"), None);
    }

    #[test]
    fn test_resolve_image_url() {
        assert_eq!(
            resolve_image_url("uploads/a.png", "http://api.local/").as_deref(),
            Some("http://api.local/uploads/a.png")
        );
        assert_eq!(
            resolve_image_url(" http://cdn.local/a.png ", "http://api.local").as_deref(),
            Some("http://cdn.local/a.png")
        );
        assert_eq!(resolve_image_url("", "http://api.local"), None);
    }
}
