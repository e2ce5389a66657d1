//! Route handlers and the `{ok, …}` response envelope.
//!
//! Success → `200 {"ok": true, "result": …}`.
//! Failure → `{"ok": false, "kind": …, "error": …}` with the HTTP status
//! derived from the error kind, so callers can branch on either layer.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gantry_runtime::{ToolCall, ToolDispatcher};
use gantry_store::ConfigStore;
use gantry_types::{GantryError, Pose, Zone};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ToolDispatcher>,
    pub store: Arc<ConfigStore>,
}

/// Build the full router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/tool-call", post(tool_call))
        .route("/status", get(status))
        .route("/config", get(config))
        .route("/config/object", post(upsert_object))
        .route("/config/zone", post(upsert_zone))
        .route("/health", get(health))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

struct ApiError(GantryError);

impl From<GantryError> for ApiError {
    fn from(err: GantryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GantryError::Resolution(_) => StatusCode::NOT_FOUND,
            GantryError::SafetyViolation { .. } => StatusCode::FORBIDDEN,
            GantryError::Motion(_) => StatusCode::CONFLICT,
            GantryError::ConfigLoad(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GantryError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(kind = self.0.kind(), error = %self.0, "request failed");
        let body = json!({
            "ok": false,
            "kind": self.0.kind(),
            "error": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

fn ok(result: Value) -> ApiResult {
    Ok(Json(json!({ "ok": true, "result": result })))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ToolCallRequest {
    name: String,
    #[serde(default)]
    arguments: Value,
}

async fn tool_call(
    State(state): State<AppState>,
    Json(request): Json<ToolCallRequest>,
) -> ApiResult {
    let call = ToolCall::parse(&request.name, request.arguments)?;
    let reply = state.dispatcher.dispatch(call).await?;
    ok(serde_json::to_value(reply).map_err(|e| GantryError::Motion(e.to_string()))?)
}

async fn status(State(state): State<AppState>) -> ApiResult {
    let reply = state.dispatcher.dispatch(ToolCall::QueryStatus {}).await?;
    ok(serde_json::to_value(reply).map_err(|e| GantryError::Motion(e.to_string()))?)
}

async fn config(State(state): State<AppState>) -> ApiResult {
    let reply = state.dispatcher.dispatch(ToolCall::GetConfig {}).await?;
    ok(serde_json::to_value(reply).map_err(|e| GantryError::Motion(e.to_string()))?)
}

#[derive(Debug, Deserialize)]
struct ObjectUpsert {
    object_id: String,
    pose: Pose,
}

async fn upsert_object(
    State(state): State<AppState>,
    Json(request): Json<ObjectUpsert>,
) -> ApiResult {
    state
        .store
        .apply_object_pose(&request.object_id, request.pose)?;
    ok(json!({ "object_id": request.object_id, "pose": request.pose }))
}

#[derive(Debug, Deserialize)]
struct ZoneUpsert {
    zone_key: String,
    center_pose: Pose,
    tolerance_m: f64,
}

async fn upsert_zone(State(state): State<AppState>, Json(request): Json<ZoneUpsert>) -> ApiResult {
    let zone = Zone {
        center_pose: request.center_pose,
        tolerance_m: request.tolerance_m,
    };
    state.store.apply_zone(&request.zone_key, zone.clone())?;
    ok(json!({ "zone_key": request.zone_key, "zone": zone }))
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
