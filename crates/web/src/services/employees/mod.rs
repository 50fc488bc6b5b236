//! Employee backend REST client.
//!
//! # API Reference
//!
//! - `GET    /api/employees`      - list all employees
//! - `POST   /api/employees`      - create (multipart)
//! - `PUT    /api/employees/{id}` - update (multipart)
//! - `DELETE /api/employees/{id}` - delete
//!
//! Every request carries `Authorization: Bearer <token>` and every response
//! is a `{ success, data?, error? }` envelope.

mod types;

pub use types::ApiEnvelope;

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, IgnoredAny};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use employee_directory_core::{Employee, EmployeeRecordId, EmployeeUpdate, NewEmployee};

/// A backend call, used to pick the user-facing failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Message shown when the backend could not be reached.
    #[must_use]
    pub const fn network_message(self) -> &'static str {
        match self {
            Self::List => "Error fetching employees",
            Self::Create => "Error saving employee",
            Self::Update => "Error updating employee",
            Self::Delete => "Error deleting employee",
        }
    }
}

/// Errors that can occur when calling the employee backend.
#[derive(Debug, Error)]
pub enum EmployeeApiError {
    /// Connection, timeout or body transfer failure.
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with `success: false` or an error status.
    #[error("Backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    /// A successful response whose body is not a usable envelope.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The configured backend URL cannot address the employee collection.
    #[error("Invalid backend URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// A record ID that cannot name a single path segment.
    #[error("Invalid record ID: {0:?}")]
    InvalidRecordId(String),
}

impl EmployeeApiError {
    /// Message surfaced to the user for a failed `operation`.
    ///
    /// Backend messages are shown verbatim.
    #[must_use]
    pub fn user_message(&self, operation: Operation) -> String {
        match self {
            Self::Backend { message, .. } => message.clone(),
            Self::Network(_)
            | Self::Parse(_)
            | Self::InvalidBaseUrl(_)
            | Self::InvalidRecordId(_) => operation.network_message().to_string(),
        }
    }
}

/// Employee backend client.
#[derive(Clone)]
pub struct EmployeeApiClient {
    inner: Arc<EmployeeApiClientInner>,
}

struct EmployeeApiClientInner {
    client: reqwest::Client,
    base_url: String,
    collection_url: Url,
}

impl std::fmt::Debug for EmployeeApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmployeeApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl EmployeeApiClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if `base_url` is not a valid URL or the HTTP client
    /// fails to build.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EmployeeApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let collection_url = Url::parse(&format!("{base_url}/api/employees"))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(EmployeeApiClientInner {
                client,
                base_url,
                collection_url,
            }),
        })
    }

    /// Backend base URL, used to resolve uploaded image paths.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// `{base}/api/employees/{id}` with `id` encoded as one path segment.
    fn record_url(&self, id: &EmployeeRecordId) -> Result<Url, EmployeeApiError> {
        let raw = id.as_str();
        if raw.is_empty() || raw == "." || raw == ".." {
            return Err(EmployeeApiError::InvalidRecordId(raw.to_string()));
        }

        let mut url = self.inner.collection_url.clone();
        url.path_segments_mut()
            .map_err(|()| EmployeeApiError::InvalidRecordId(raw.to_string()))?
            .push(raw);
        Ok(url)
    }

    /// Fetch every employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    #[instrument(skip_all)]
    pub async fn list(&self, token: &SecretString) -> Result<Vec<Employee>, EmployeeApiError> {
        let response = self
            .inner
            .client
            .get(self.inner.collection_url.clone())
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        let employees: Option<Vec<Employee>> = Self::handle_response(response).await?;
        Ok(employees.unwrap_or_default())
    }

    /// Create an employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    #[instrument(skip_all, fields(employee_id = %employee.employee_id))]
    pub async fn create(
        &self,
        token: &SecretString,
        employee: &NewEmployee,
    ) -> Result<(), EmployeeApiError> {
        let form = types::create_form(employee)?;
        let response = self
            .inner
            .client
            .post(self.inner.collection_url.clone())
            .bearer_auth(token.expose_secret())
            .multipart(form)
            .send()
            .await?;

        Self::handle_response::<IgnoredAny>(response).await?;
        Ok(())
    }

    /// Update an employee. The business `employeeId` is never sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    #[instrument(skip(self, token, update))]
    pub async fn update(
        &self,
        token: &SecretString,
        id: &EmployeeRecordId,
        update: &EmployeeUpdate,
    ) -> Result<(), EmployeeApiError> {
        let url = self.record_url(id)?;
        let form = types::update_form(update)?;
        let response = self
            .inner
            .client
            .put(url)
            .bearer_auth(token.expose_secret())
            .multipart(form)
            .send()
            .await?;

        Self::handle_response::<IgnoredAny>(response).await?;
        Ok(())
    }

    /// Delete an employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    #[instrument(skip(self, token))]
    pub async fn delete(
        &self,
        token: &SecretString,
        id: &EmployeeRecordId,
    ) -> Result<(), EmployeeApiError> {
        let url = self.record_url(id)?;
        let response = self
            .inner
            .client
            .delete(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        Self::handle_response::<IgnoredAny>(response).await?;
        Ok(())
    }

    /// Unwrap the response envelope.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Option<T>, EmployeeApiError> {
        let status = response.status();
        let body = response.bytes().await?;
        if status.is_success() && body.is_empty() {
            return Ok(None);
        }

        match serde_json::from_slice::<ApiEnvelope<T>>(&body) {
            Ok(envelope) if envelope.success && status.is_success() => Ok(envelope.data),
            Ok(envelope) => Err(EmployeeApiError::Backend {
                status: status.as_u16(),
                message: envelope
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| status_message(status.as_u16())),
            }),
            Err(_) if !status.is_success() => Err(EmployeeApiError::Backend {
                status: status.as_u16(),
                message: status_message(status.as_u16()),
            }),
            Err(e) => Err(EmployeeApiError::Parse(format!(
                "Failed to parse response: {e}"
            ))),
        }
    }
}

fn status_message(status: u16) -> String {
    format!("Request failed with status {status}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mockito::Matcher;

    use employee_directory_core::PendingImage;

    use super::*;

    fn client(server: &mockito::Server) -> EmployeeApiClient {
        EmployeeApiClient::new(&server.url(), Duration::from_secs(5)).unwrap()
    }

    fn token() -> SecretString {
        SecretString::from("header.payload.sig")
    }

    fn new_employee() -> NewEmployee {
        NewEmployee {
            employee_id: "E1".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            age: 30,
            role: "eng".to_string(),
            contact: "555-0100".to_string(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_list_sends_bearer_and_parses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/employees")
            .match_header("authorization", "Bearer header.payload.sig")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success":true,"data":[
                    {"_id":"r1","employeeId":"E1","firstName":"Ann","lastName":"Lee","age":30,"role":"eng"},
                    {"_id":"r2","employeeId":"E2","firstName":"Bo","lastName":"Kim","age":"n/a","role":"ops"}
                ]}"#,
            )
            .create_async()
            .await;

        let employees = client(&server).list(&token()).await.unwrap();
        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].full_name(), "Ann Lee");
        assert_eq!(employees[1].age, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_success_false_is_surfaced_verbatim() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/employees")
            .with_status(200)
            .with_body(r#"{"success":false,"error":"Token expired"}"#)
            .create_async()
            .await;

        let err = client(&server).list(&token()).await.unwrap_err();
        assert_eq!(err.user_message(Operation::List), "Token expired");
    }

    #[tokio::test]
    async fn test_record_id_stays_inside_collection() {
        let mut server = mockito::Server::new_async().await;
        let escaped = server
            .mock("DELETE", Matcher::Regex("^/admin".to_string()))
            .expect(0)
            .create_async()
            .await;
        let encoded = server
            .mock("DELETE", Matcher::Regex("^/api/employees/[^/]+$".to_string()))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let client = client(&server);
        let id = EmployeeRecordId::new("../../admin/purge");
        assert!(
            client
                .record_url(&id)
                .unwrap()
                .as_str()
                .ends_with("/api/employees/..%2F..%2Fadmin%2Fpurge")
        );
        client.delete(&token(), &id).await.unwrap();

        escaped.assert_async().await;
        encoded.assert_async().await;
    }

    #[tokio::test]
    async fn test_dot_segment_ids_are_rejected() {
        let server = mockito::Server::new_async().await;
        for raw in ["", ".", ".."] {
            let err = client(&server)
                .delete(&token(), &EmployeeRecordId::new(raw))
                .await
                .unwrap_err();
            assert!(matches!(err, EmployeeApiError::InvalidRecordId(_)), "{raw:?}");
            assert_eq!(
                err.user_message(Operation::Delete),
                "Error deleting employee"
            );
        }
    }

    #[tokio::test]
    async fn test_unparseable_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/employees/r1")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        let err = client(&server)
            .delete(&token(), &EmployeeRecordId::new("r1"))
            .await
            .unwrap_err();
        assert!(matches!(err, EmployeeApiError::Backend { status: 502, .. }));
        assert_eq!(
            err.user_message(Operation::Delete),
            "Request failed with status 502"
        );
    }

    #[tokio::test]
    async fn test_error_status_with_envelope_uses_backend_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/employees")
            .with_status(400)
            .with_body(r#"{"success":false,"error":"Employee ID already exists"}"#)
            .create_async()
            .await;

        let err = client(&server)
            .create(&token(), &new_employee())
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(Operation::Create),
            "Employee ID already exists"
        );
    }

    #[tokio::test]
    async fn test_create_sends_multipart_fields_and_profile() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/employees")
            .match_header("authorization", "Bearer header.payload.sig")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="employeeId"\r\n\r\nE1"#.to_string()),
                Matcher::Regex(r#"name="age"\r\n\r\n30"#.to_string()),
                Matcher::Regex(r#"name="profile"; filename="ann.png""#.to_string()),
            ]))
            .with_status(201)
            .with_body(r#"{"success":true,"data":{"_id":"r9"}}"#)
            .create_async()
            .await;

        let employee = NewEmployee {
            image: Some(PendingImage::new("ann.png", "image/png", b"png-bytes".to_vec()).unwrap()),
            ..new_employee()
        };
        client(&server).create(&token(), &employee).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_omits_employee_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/employees/r1")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="firstName"\r\n\r\nAnn"#.to_string()),
                Matcher::Regex(r#"name="age"\r\n\r\nabc"#.to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"success":true,"data":{}}"#)
            .create_async()
            .await;
        let forbidden = server
            .mock("PUT", "/api/employees/r1")
            .match_body(Matcher::Regex("employeeId".to_string()))
            .expect(0)
            .create_async()
            .await;

        let update = EmployeeUpdate {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            age: "abc".to_string(),
            role: "eng".to_string(),
            contact: String::new(),
            image: None,
        };
        client(&server)
            .update(&token(), &EmployeeRecordId::new("r1"), &update)
            .await
            .unwrap();
        mock.assert_async().await;
        forbidden.assert_async().await;
    }

    #[tokio::test]
    async fn test_network_failure_uses_operation_message() {
        // Nothing listens on port 9 (discard) in the test environment
        let client = EmployeeApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.list(&token()).await.unwrap_err();
        assert!(matches!(err, EmployeeApiError::Network(_)));
        assert_eq!(
            err.user_message(Operation::List),
            "Error fetching employees"
        );
    }

    #[tokio::test]
    async fn test_success_with_garbage_body_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/employees")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client(&server).list(&token()).await.unwrap_err();
        assert!(matches!(err, EmployeeApiError::Parse(_)));
        assert_eq!(err.user_message(Operation::List), "Error fetching employees");
    }
}
