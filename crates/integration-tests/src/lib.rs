//! Integration tests for Pawgo.
//!
//! # Running Tests
//!
//! ```bash
//! # Cross-crate rule tests, no server needed
//! cargo test -p pawgo-integration-tests
//!
//! # Live API tests against a migrated database and a running server
//! cargo run -p pawgo-cli -- migrate
//! PAWGO_TRUST_PROXY_HEADERS=true cargo run -p pawgo-api &
//! cargo test -p pawgo-integration-tests -- --ignored
//! ```
//!
//! Each registration sends its own `X-Forwarded-For` address, so with proxy
//! headers trusted the credential rate limiter never throttles a test run.
//!
//! `PAWGO_TEST_BASE_URL` points the live tests at a server other than
//! `http://localhost:8080`.

use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("PAWGO_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Unique address so repeated runs never collide on the email constraint.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@test.pawgo.pet", Uuid::new_v4().simple())
}

/// A private address unique to one request.
fn unique_client_ip() -> String {
    let [a, b, c, ..] = *Uuid::new_v4().as_bytes();
    format!("10.{a}.{b}.{c}")
}

/// A registered account and its bearer token.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

/// HTTP client bound to the API base URL.
#[derive(Debug, Clone)]
pub struct TestClient {
    client: Client,
    base_url: String,
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: base_url(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Register a fresh account with the given role.
    ///
    /// # Panics
    ///
    /// Panics if the server is unreachable or refuses the registration.
    pub async fn register(&self, role: &str) -> TestUser {
        let resp = self
            .client
            .post(self.url("/api/users/register"))
            .header("x-forwarded-for", unique_client_ip())
            .json(&json!({
                "name": format!("Test {role}"),
                "email": unique_email(role),
                "password": "correct horse battery",
                "role": role,
            }))
            .send()
            .await
            .expect("register request failed");
        assert_eq!(resp.status(), StatusCode::CREATED, "register as {role}");

        let body: Value = resp.json().await.expect("register body");
        TestUser {
            id: body["user"]["id"].as_i64().expect("user id"),
            token: body["token"].as_str().expect("token").to_owned(),
        }
    }

    /// Send a request with an optional bearer token and JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        user: Option<&TestUser>,
        body: Option<Value>,
    ) -> Response {
        let mut request = self.client.request(method, self.url(path));
        if let Some(user) = user {
            request = request.bearer_auth(&user.token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        request.send().await.expect("request failed")
    }

    /// Send a request that must be refused with 403 and a JSON error.
    ///
    /// # Panics
    ///
    /// Panics on any other status or a body without an `error` message.
    pub async fn expect_forbidden(
        &self,
        method: reqwest::Method,
        path: &str,
        user: &TestUser,
        body: Option<Value>,
    ) {
        let label = format!("{method} {path}");
        let body = self
            .expect_json(method, path, Some(user), body, StatusCode::FORBIDDEN)
            .await;
        assert!(body["error"].is_string(), "{label}");
    }

    /// Send a request and decode the JSON reply, asserting the status.
    ///
    /// # Panics
    ///
    /// Panics on a status mismatch or a non-JSON body.
    pub async fn expect_json(
        &self,
        method: reqwest::Method,
        path: &str,
        user: Option<&TestUser>,
        body: Option<Value>,
        status: StatusCode,
    ) -> Value {
        let resp = self.send(method, path, user, body).await;
        assert_eq!(resp.status(), status, "{path}");
        resp.json().await.expect("json body")
    }
}
