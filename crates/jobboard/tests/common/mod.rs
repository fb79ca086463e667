//! Test utilities and common setup.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use jobboard::api;
use jobboard::auth::{PasswordHasher, TokenIssuer};
use jobboard::db::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

pub const TOKEN_TTL_SECS: i64 = 3600;

/// A router over a fresh in-memory database, plus the issuer it trusts.
pub struct TestApp {
    pub router: Router,
    pub tokens: TokenIssuer,
}

/// Create a test application with all services initialized.
pub async fn test_app() -> TestApp {
    let db = Database::in_memory().await.unwrap();
    let tokens = TokenIssuer::new(TEST_SECRET.as_bytes(), TOKEN_TTL_SECS);

    // Minimum bcrypt cost keeps the suite fast.
    let state = api::AppState::new(&db, PasswordHasher::new(4), tokens.clone(), Vec::new());

    TestApp {
        router: api::create_router(state),
        tokens,
    }
}

impl TestApp {
    /// Send a request and decode the JSON body (`Value::Null` when empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri).method(method);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    /// Register a user and return the created user object.
    pub async fn register(&self, name: &str, email: &str, password: &str, role: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": password,
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["user"].clone()
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Register and log in an admin, returning its token.
    pub async fn admin_token(&self, email: &str) -> String {
        self.register("Admin", email, "admin-pass-1", "admin").await;
        self.login(email, "admin-pass-1").await
    }

    /// Register and log in a candidate, returning its token.
    pub async fn candidate_token(&self, email: &str) -> String {
        self.register("Candidate", email, "cand-pass-1", "candidate")
            .await;
        self.login(email, "cand-pass-1").await
    }

    /// Post a job as `admin_token` and return its id.
    pub async fn create_job(
        &self,
        admin_token: &str,
        title: &str,
        location: &str,
        job_type: &str,
    ) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/jobs",
                Some(admin_token),
                Some(json!({
                    "title": title,
                    "description": format!("{title} role description"),
                    "location": location,
                    "job_type": job_type,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create job failed: {body}");
        body["job"]["job_id"].as_str().unwrap().to_string()
    }
}
