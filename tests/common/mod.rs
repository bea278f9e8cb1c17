//! In-process fake of the emulator's REST surface.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::put,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// Shared state of the fake emulator.
#[derive(Clone, Default)]
pub struct FakeEmulator {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    topics: HashMap<String, Value>,
    subscriptions: HashMap<String, Value>,
    requests: Vec<String>,
    /// Status returned for every request whose "METHOD path" starts with the key.
    failures: Vec<(String, StatusCode)>,
}

impl FakeEmulator {
    /// Seed a topic as if it had been created earlier.
    pub fn add_topic(&self, project: &str, topic: &str) {
        let name = format!("projects/{}/topics/{}", project, topic);
        self.inner
            .lock()
            .unwrap()
            .topics
            .insert(name.clone(), json!({ "name": name }));
    }

    /// Seed a subscription with an arbitrary body.
    pub fn add_subscription(&self, project: &str, subscription: &str, body: Value) {
        let name = format!("projects/{}/subscriptions/{}", project, subscription);
        self.inner.lock().unwrap().subscriptions.insert(name, body);
    }

    /// Make requests matching `prefix` (e.g. "PUT /v1/projects/p/topics/t") fail.
    pub fn fail(&self, prefix: &str, status: StatusCode) {
        self.inner
            .lock()
            .unwrap()
            .failures
            .push((prefix.to_string(), status));
    }

    /// Requests received so far, as "METHOD path".
    pub fn requests(&self) -> Vec<String> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// Stored subscription body, if any.
    pub fn subscription(&self, project: &str, subscription: &str) -> Option<Value> {
        let name = format!("projects/{}/subscriptions/{}", project, subscription);
        self.inner.lock().unwrap().subscriptions.get(&name).cloned()
    }

    /// Whether the topic exists.
    pub fn has_topic(&self, project: &str, topic: &str) -> bool {
        let name = format!("projects/{}/topics/{}", project, topic);
        self.inner.lock().unwrap().topics.contains_key(&name)
    }

    fn record(&self, method: &str, path: &str) -> Option<Response> {
        let line = format!("{} {}", method, path);
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(line.clone());
        inner
            .failures
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, status)| error(*status, "injected failure"))
    }

    /// Serve the fake on an ephemeral local port.
    pub async fn spawn(&self) -> SocketAddr {
        let app = Router::new()
            .route(
                "/v1/projects/{project}/topics/{topic}",
                put(create_topic).get(get_topic),
            )
            .route(
                "/v1/projects/{project}/subscriptions/{subscription}",
                put(create_subscription)
                    .get(get_subscription)
                    .delete(delete_subscription),
            )
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        addr
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "error": {
            "code": status.as_u16(),
            "message": message,
            "status": match status {
                StatusCode::NOT_FOUND => "NOT_FOUND",
                StatusCode::CONFLICT => "ALREADY_EXISTS",
                StatusCode::BAD_REQUEST => "INVALID_ARGUMENT",
                _ => "INTERNAL",
            }
        }
    });
    (status, Json(body)).into_response()
}

async fn create_topic(
    Path((project, topic)): Path<(String, String)>,
    State(state): State<FakeEmulator>,
    Json(_payload): Json<Value>,
) -> Response {
    let name = format!("projects/{}/topics/{}", project, topic);
    if let Some(failure) = state.record("PUT", &format!("/v1/{}", name)) {
        return failure;
    }

    let mut inner = state.inner.lock().unwrap();
    if inner.topics.contains_key(&name) {
        return error(StatusCode::CONFLICT, "Topic already exists");
    }
    let body = json!({ "name": name });
    inner.topics.insert(name, body.clone());
    (StatusCode::OK, Json(body)).into_response()
}

async fn get_topic(Path((project, topic)): Path<(String, String)>, State(state): State<FakeEmulator>) -> Response {
    let name = format!("projects/{}/topics/{}", project, topic);
    if let Some(failure) = state.record("GET", &format!("/v1/{}", name)) {
        return failure;
    }

    let inner = state.inner.lock().unwrap();
    match inner.topics.get(&name) {
        Some(body) => (StatusCode::OK, Json(body.clone())).into_response(),
        None => error(StatusCode::NOT_FOUND, "Topic not found"),
    }
}

async fn create_subscription(
    Path((project, subscription)): Path<(String, String)>,
    State(state): State<FakeEmulator>,
    Json(payload): Json<Value>,
) -> Response {
    let name = format!("projects/{}/subscriptions/{}", project, subscription);
    if let Some(failure) = state.record("PUT", &format!("/v1/{}", name)) {
        return failure;
    }

    let mut inner = state.inner.lock().unwrap();
    if inner.subscriptions.contains_key(&name) {
        return error(StatusCode::CONFLICT, "Subscription already exists");
    }

    let topic = payload["topic"].as_str().unwrap_or_default();
    if !inner.topics.contains_key(topic) {
        return error(StatusCode::NOT_FOUND, "Topic not found");
    }
    if let Some(dlt) = payload["deadLetterPolicy"]["deadLetterTopic"].as_str() {
        if !inner.topics.contains_key(dlt) {
            return error(StatusCode::NOT_FOUND, "Dead letter topic not found");
        }
    }

    let mut body = payload.clone();
    body["name"] = Value::from(name.clone());
    inner.subscriptions.insert(name, body.clone());
    (StatusCode::OK, Json(body)).into_response()
}

async fn get_subscription(
    Path((project, subscription)): Path<(String, String)>,
    State(state): State<FakeEmulator>,
) -> Response {
    let name = format!("projects/{}/subscriptions/{}", project, subscription);
    if let Some(failure) = state.record("GET", &format!("/v1/{}", name)) {
        return failure;
    }

    let inner = state.inner.lock().unwrap();
    match inner.subscriptions.get(&name) {
        Some(body) => (StatusCode::OK, Json(body.clone())).into_response(),
        None => error(StatusCode::NOT_FOUND, "Subscription not found"),
    }
}

async fn delete_subscription(
    Path((project, subscription)): Path<(String, String)>,
    State(state): State<FakeEmulator>,
) -> Response {
    let name = format!("projects/{}/subscriptions/{}", project, subscription);
    if let Some(failure) = state.record("DELETE", &format!("/v1/{}", name)) {
        return failure;
    }

    let mut inner = state.inner.lock().unwrap();
    match inner.subscriptions.remove(&name) {
        Some(_) => (StatusCode::OK, Json(json!({}))).into_response(),
        None => error(StatusCode::NOT_FOUND, "Subscription not found"),
    }
}
