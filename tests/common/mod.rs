//! Common test utilities

#![allow(dead_code)]

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::util::ServiceExt;

use atm_simulator::api::{self, AppState};
use atm_simulator::{db, Ledger};

/// Fresh in-memory database with the schema and demo customers
pub async fn setup_test_db() -> SqlitePool {
    let pool = db::connect_in_memory()
        .await
        .expect("Failed to open in-memory database");
    db::initialize(&pool).await.expect("Failed to initialize database");
    pool
}

pub async fn setup_test_ledger() -> Ledger {
    Ledger::new(setup_test_db().await)
}

/// Router over a seeded database
pub async fn setup_test_app() -> Router {
    setup_test_app_with_ttl(Duration::from_secs(900)).await
}

pub async fn setup_test_app_with_ttl(session_ttl: Duration) -> Router {
    let pool = setup_test_db().await;
    api::build_router(AppState::new(pool, session_ttl))
}

/// A browser-like client that keeps the session cookie between requests
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    pub async fn get(&mut self, uri: &str) -> (StatusCode, Value) {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> (StatusCode, Value) {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        self.post_raw(uri, Some("application/x-www-form-urlencoded"), body)
            .await
    }

    /// POST an arbitrary body, optionally without a content type
    pub async fn post_raw(
        &mut self,
        uri: &str,
        content_type: Option<&str>,
        body: impl Into<String>,
    ) -> (StatusCode, Value) {
        let mut builder = self.request("POST", uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body.into())).unwrap();
        self.send(request).await
    }

    pub async fn login(&mut self, name: &str, pin: &str) -> (StatusCode, Value) {
        self.post_form("/login", &[("name", name), ("pin", pin)]).await
    }

    pub fn has_session(&self) -> bool {
        self.cookie.is_some()
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let value = value.to_str().unwrap();
            let pair = value.split(';').next().unwrap_or_default().trim();
            if value.contains("Max-Age=0") {
                self.cookie = None;
            } else {
                self.cookie = Some(pair.to_string());
            }
        }

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, body)
    }
}

fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => (b as char).to_string(),
            b' ' => "+".to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}
