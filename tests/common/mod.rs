// tests/common/mod.rs
//
// In-process HTTP fakes for the calendar source and the notification service.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    routing::post,
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::Value;

pub const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Serve `app` on an ephemeral loopback port and return its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve fake");
    });
    format!("http://{addr}")
}

/// Requests received by the fake notification service: (path, JSON body).
#[derive(Clone, Default)]
pub struct Captured(pub Arc<Mutex<Vec<(String, Value)>>>);

impl Captured {
    pub fn take(&self) -> Vec<(String, Value)> {
        std::mem::take(&mut *self.0.lock())
    }
}

#[derive(Clone)]
struct SinkState {
    status: StatusCode,
    captured: Captured,
}

async fn record(State(s): State<SinkState>, uri: Uri, Json(body): Json<Value>) -> StatusCode {
    s.captured.0.lock().push((uri.path().to_string(), body));
    s.status
}

/// Fake notification service answering every delivery with `status`.
pub async fn spawn_sink(status: StatusCode) -> (String, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .route("/send_calendar", post(record))
        .route("/send_alert", post(record))
        .route("/send_signal", post(record))
        .with_state(SinkState {
            status,
            captured: captured.clone(),
        });
    (spawn_server(app).await, captured)
}
