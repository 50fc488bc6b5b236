//! End-to-end harness for the employee directory frontend.
//!
//! Each [`TestApp`] serves the real router on an ephemeral port, backed by a
//! `mockito` server standing in for the employee REST API. The client keeps
//! cookies and does not follow redirects, so tests can assert on `Location`.
//!
//! ```bash
//! cargo test -p employee-directory-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::cookie::Jar;
use reqwest::{Client, Response, redirect};
use url::Url;

use employee_directory_web::app;
use employee_directory_web::config::DirectoryConfig;
use employee_directory_web::state::AppState;

/// Allow-listed admin address used by every [`TestApp`].
pub const ADMIN_EMAIL: &str = "boss@example.com";

/// Value placed in both the CSRF cookie and the callback form.
pub const CSRF_TOKEN: &str = "csrf-test-token";

/// A running frontend plus its mocked backend.
pub struct TestApp {
    pub address: Url,
    pub client: Client,
    pub backend: mockito::ServerGuard,
    jar: Arc<Jar>,
}

impl TestApp {
    /// Start the frontend against a fresh mock backend.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn spawn() -> Self {
        let backend = mockito::Server::new_async().await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener
            .local_addr()
            .expect("Failed to read local address")
            .port();
        let address =
            Url::parse(&format!("http://127.0.0.1:{port}")).expect("Failed to parse address");

        let vars: HashMap<&str, String> = HashMap::from([
            ("DIRECTORY_BASE_URL", address.to_string()),
            ("GOOGLE_CLIENT_ID", "test-client.apps.googleusercontent.com".to_string()),
            ("EMPLOYEE_API_URL", backend.url()),
            ("EMPLOYEE_API_TIMEOUT_SECS", "5".to_string()),
            ("ADMIN_EMAILS", ADMIN_EMAIL.to_string()),
        ]);
        let config = DirectoryConfig::from_lookup(|key| vars.get(key).cloned())
            .expect("Failed to build test configuration");
        let state = AppState::new(config).expect("Failed to create application state");

        tokio::spawn(async move {
            axum::serve(listener, app(state))
                .await
                .expect("Test server failed");
        });

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            address,
            client,
            backend,
            jar,
        }
    }

    /// Absolute URL for a path on the frontend.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid relative URL.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        self.address.join(path).expect("Invalid test path")
    }

    /// Set the cookie Google Identity Services writes before its callback.
    pub fn set_csrf_cookie(&self) {
        self.jar
            .add_cookie_str(&format!("g_csrf_token={CSRF_TOKEN}; Path=/"), &self.address);
    }

    /// Post a Google callback for `email` with the given login mode.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn google_callback(&self, mode: &str, email: &str, name: &str) -> Response {
        self.set_csrf_cookie();
        self.client
            .post(self.url(&format!("/login?mode={mode}")))
            .form(&[
                ("credential", fake_id_token(email, name)),
                ("g_csrf_token", CSRF_TOKEN.to_string()),
            ])
            .send()
            .await
            .expect("Failed to post login callback")
    }

    /// Sign in as the allow-listed admin.
    pub async fn login_admin(&self) -> Response {
        self.google_callback("admin", ADMIN_EMAIL, "Boss Person").await
    }

    /// Sign in with read-only access.
    pub async fn login_user(&self) -> Response {
        self.google_callback("user", "ann@example.com", "Ann Lee").await
    }

    /// GET a page and return its status and body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn get_page(&self, path: &str) -> (reqwest::StatusCode, String) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send request");
        let status = response.status();
        let body = response.text().await.expect("Failed to read body");
        (status, body)
    }
}

/// Unsigned JWT carrying Google-style identity claims.
#[must_use]
pub fn fake_id_token(email: &str, name: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","kid":"test","typ":"JWT"}"#);
    let claims = serde_json::json!({
        "iss": "https://accounts.google.com",
        "sub": "10769150350006150715113082367",
        "email": email,
        "email_verified": true,
        "name": name,
        "picture": "https://lh3.googleusercontent.com/a/test",
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.dGVzdC1zaWduYXR1cmU")
}

/// `Location` header of a redirect response.
///
/// # Panics
///
/// Panics if the header is missing.
#[must_use]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .expect("Missing Location header")
        .to_str()
        .expect("Non-ASCII Location header")
        .to_string()
}

/// Backend list payload with two employees.
#[must_use]
pub fn sample_employees() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "data": [
            {
                "_id": "rec-1",
                "employeeId": "E001",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "age": 36,
                "role": "Engineer",
                "contact": "555-0101",
                "profile": "uploads/ada.png"
            },
            {
                "_id": "rec-2",
                "employeeId": "E002",
                "firstName": "Tim",
                "lastName": "Young",
                "age": 22,
                "role": "Intern",
                "contact": ""
            }
        ]
    })
}
