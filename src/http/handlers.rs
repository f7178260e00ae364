//! Route handlers.
//!
//! Handlers see cleartext bodies; sealing happens in the middleware. The
//! check-in handler's only dependency is the injected [`VisitRecorder`].

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::observability::Logger;
use crate::store::VisitRecorder;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub visits: Arc<dyn VisitRecorder>,
}

impl AppState {
    pub fn new(visits: Arc<dyn VisitRecorder>) -> Self {
        Self { visits }
    }
}

/// Check-in payload. Missing fields default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckInRequest {
    pub id: i64,
    pub place_id: i64,
}

#[derive(Debug, Serialize)]
struct Message {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn server_error(error: &dyn std::error::Error) -> Response {
    let body = ErrorBody {
        error: error.to_string(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Record a visit.
///
/// Malformed payloads are answered with 500, the same as store failures.
pub async fn check_in(State(state): State<AppState>, logger: Logger, body: Bytes) -> Response {
    logger.instrument(record_visit(state, body)).await
}

async fn record_visit(state: AppState, body: Bytes) -> Response {
    tracing::info!("Check-in");

    let check: CheckInRequest = match serde_json::from_slice(&body) {
        Ok(check) => check,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid check-in payload");
            return server_error(&e);
        }
    };

    if let Err(e) = state.visits.insert(check.id, check.place_id).await {
        tracing::error!(
            id = check.id,
            place_id = check.place_id,
            error = %e,
            "Failed to record visit"
        );
        return server_error(&e);
    }

    Json(Message { message: "ok" }).into_response()
}

/// Currently visited places. Not implemented; always an empty 200.
pub async fn recently() {}

/// Check out from a place. Not implemented; always an empty 200.
pub async fn check_out() {}
