//! Google sign-in, session lifecycle and route guards.

#![allow(clippy::unwrap_used)]

use mockito::Matcher;
use reqwest::StatusCode;

use employee_directory_integration_tests::{
    CSRF_TOKEN, TestApp, fake_id_token, location, sample_employees,
};

async fn mock_list(app: &mut TestApp, hits: usize) -> mockito::Mock {
    app.backend
        .mock("GET", "/api/employees")
        .match_header("authorization", Matcher::Regex("^Bearer .+".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(sample_employees().to_string())
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;
    let (status, body) = app.get_page("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_login_page_modes() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get_page("/login").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("User Login"));
    assert!(body.contains("User (Read-only)"));
    assert!(body.contains("Switch to Admin"));
    assert!(body.contains("test-client.apps.googleusercontent.com"));
    assert!(body.contains(r#"data-auto_prompt="true""#));

    let (_, body) = app.get_page("/login?mode=admin").await;
    assert!(body.contains("Admin Login"));
    assert!(body.contains("Admin (Full Access)"));
    assert!(body.contains("/login?mode=user"));
    assert!(body.contains("mode=admin"));
}

#[tokio::test]
async fn test_root_shows_login_when_signed_out() {
    let app = TestApp::spawn().await;
    let (status, body) = app.get_page("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("User Login"));
}

#[tokio::test]
async fn test_directory_requires_session() {
    let app = TestApp::spawn().await;

    for path in ["/employees", "/logout", "/employees/rec-1/delete"] {
        let response = app.client.get(app.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), "/login");
    }
}

#[tokio::test]
async fn test_callback_without_csrf_cookie_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/login?mode=user"))
        .form(&[
            ("credential", fake_id_token("ann@example.com", "Ann")),
            ("g_csrf_token", CSRF_TOKEN.to_string()),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_credential_returns_to_login() {
    let app = TestApp::spawn().await;
    app.set_csrf_cookie();

    let response = app
        .client
        .post(app.url("/login?mode=user"))
        .form(&[("credential", "garbage"), ("g_csrf_token", CSRF_TOKEN)])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with("/login?mode=user&error="), "{target}");

    let (_, body) = app.get_page(&target).await;
    assert!(body.contains("Login failed. Please try again."));
}

#[tokio::test]
async fn test_admin_login_outside_allow_list_is_refused() {
    let app = TestApp::spawn().await;

    let response = app
        .google_callback("admin", "intruder@example.com", "Mallory")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert!(target.starts_with("/login?mode=admin&error="), "{target}");

    let (_, body) = app.get_page(&target).await;
    assert!(body.contains("You are not authorized as an admin"));
    assert!(body.contains("Admin Login"));

    // No session was created.
    let response = app.client.get(app.url("/employees")).send().await.unwrap();
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_admin_login_shows_welcome_once() {
    let mut app = TestApp::spawn().await;
    let list = mock_list(&mut app, 2).await;

    let response = app.login_admin().await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/employees");

    let (status, body) = app.get_page("/employees").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Welcome Admin Boss Person!"));
    assert!(body.contains("Boss Person"));
    assert!(body.contains("Add New Employee"));

    let (_, body) = app.get_page("/employees").await;
    assert!(!body.contains("Welcome Admin Boss Person!"));

    list.assert_async().await;
}

#[tokio::test]
async fn test_user_login_is_read_only() {
    let mut app = TestApp::spawn().await;
    let _list = mock_list(&mut app, 1).await;

    let response = app.login_user().await;
    assert_eq!(location(&response), "/employees");

    let (_, body) = app.get_page("/employees").await;
    assert!(body.contains("Welcome Ann Lee!"));
    assert!(body.contains("You are in read-only mode"));
    assert!(!body.contains("Add New Employee"));
    assert!(!body.contains("/employees/rec-1/edit"));
}

#[tokio::test]
async fn test_allow_listed_user_intent_stays_read_only() {
    let mut app = TestApp::spawn().await;
    let _list = mock_list(&mut app, 1).await;

    app.google_callback("user", "BOSS@example.com", "Boss Person")
        .await;

    let (_, body) = app.get_page("/employees").await;
    assert!(body.contains("Welcome Boss Person!"));
    assert!(body.contains("You are in read-only mode"));
}

#[tokio::test]
async fn test_root_redirects_when_signed_in() {
    let app = TestApp::spawn().await;
    app.login_user().await;

    let response = app.client.get(app.url("/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/employees");
}

#[tokio::test]
async fn test_logout_flow() {
    let app = TestApp::spawn().await;
    app.login_admin().await;

    let (status, body) = app.get_page("/logout").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Are you sure you want to log out?"));

    let response = app.client.post(app.url("/logout")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = app.client.get(app.url("/employees")).send().await.unwrap();
    assert_eq!(location(&response), "/login");
}
