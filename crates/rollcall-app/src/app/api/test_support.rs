//! Helpers for driving the API through an in-memory store.

use std::sync::Arc;

use rollcall_core::config::Settings;
use rollcall_service::store::{AttendanceStore, MemoryKeyValueStore, StoreOptions};
use salvo::http::header::HeaderName;
use salvo::http::{Method, ReqBody, StatusCode};
use salvo::prelude::*;
use salvo::test::{RequestBuilder, ResponseExt, TestClient};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::ConfigHandler;
use crate::store_handler::{SharedStore, StoreHandler};

pub const CALCULUS_WEEKLY: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Rollcall//Tests//EN\r\n\
BEGIN:VEVENT\r\n\
UID:calc-1\r\n\
SUMMARY:Calculus\r\n\
DTSTART:20260105T090000\r\n\
DTEND:20260105T100000\r\n\
RRULE:FREQ=WEEKLY;COUNT=5\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:phys-1\r\n\
SUMMARY:Physics\r\n\
DTSTART:20260107T140000\r\n\
DTEND:20260107T153000\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// An API service over a fresh in-memory store and default settings.
pub struct TestApp {
    pub service: Service,
    pub store: SharedStore,
    pub backend: MemoryKeyValueStore,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(Settings::from_toml("").expect("Default settings should load"))
    }

    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        let backend = MemoryKeyValueStore::new();
        let store = AttendanceStore::load(
            Box::new(backend.clone()),
            StoreOptions::from_settings(&settings),
        );
        let store: SharedStore = Arc::new(Mutex::new(store));

        let router = Router::new()
            .hoop(StoreHandler {
                store: Arc::clone(&store),
            })
            .hoop(ConfigHandler { settings })
            .push(super::routes());

        Self {
            service: Service::new(router),
            store,
            backend,
        }
    }

    /// Imports `document` and returns the response body.
    pub async fn import(&self, document: &str) -> Value {
        TestRequest::post("/api/schedule/import")
            .content_type("text/calendar; charset=utf-8")
            .body(document)
            .send(&self.service)
            .await
            .assert_status(StatusCode::OK)
            .json()
    }

    /// Lists stored occurrences through the API.
    pub async fn occurrences(&self) -> Vec<Value> {
        let body = TestRequest::get("/api/occurrences")
            .send(&self.service)
            .await
            .assert_status(StatusCode::OK)
            .json();
        body.as_array().cloned().expect("Occurrences should be an array")
    }
}

pub struct TestRequest {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl TestRequest {
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn patch(path: &str) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn content_type(mut self, content_type: &str) -> Self {
        self.headers
            .push(("Content-Type".to_string(), content_type.to_string()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn json_body(self, value: &Value) -> Self {
        self.content_type("application/json")
            .body(value.to_string())
    }

    pub async fn send(self, service: &Service) -> TestResponse {
        let url = format!("http://127.0.0.1:5800{}", self.path);

        let mut client = match self.method.as_str() {
            "GET" => TestClient::get(&url),
            "POST" => TestClient::post(&url),
            "DELETE" => TestClient::delete(&url),
            _ => RequestBuilder::new(&url, self.method.clone()),
        };

        for (name, value) in self.headers {
            if let Ok(header_name) = HeaderName::try_from(name.as_str()) {
                client = client.add_header(header_name, value, true);
            }
        }

        if let Some(body_bytes) = self.body {
            client = client.body(ReqBody::Once(body_bytes.into()));
        }

        let mut response = client.send(service).await;
        let status = response
            .status_code
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response
            .take_bytes(None)
            .await
            .unwrap_or_default()
            .to_vec();

        TestResponse { status, body }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    #[must_use]
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {expected} but got {}: {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body should be JSON")
    }
}
