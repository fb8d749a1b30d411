// src/api.rs
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::format::FormattedOutput;
use crate::pipeline::{CalendarPipeline, Stage};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CalendarPipeline>,
}

impl AppState {
    pub fn new(pipeline: CalendarPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/calendar", get(get_calendar))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct SuccessBody<'a> {
    status: &'static str,
    data: &'a FormattedOutput,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: &'static str,
    stage: Stage,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a FormattedOutput>,
}

/// One full pipeline run per request.
async fn get_calendar(State(state): State<AppState>) -> Response {
    match state.pipeline.run().await {
        Ok(report) => Json(SuccessBody {
            status: "success",
            data: &report.output,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, stage = ?e.stage(), "calendar request failed");
            let body = ErrorBody {
                status: "error",
                stage: e.stage(),
                detail: e.to_string(),
                data: e.output(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
