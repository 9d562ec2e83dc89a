//! REST API handlers.
//!
//! Each handler delegates to `PrewarmService` and returns JSON responses.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use poolwarm_orchestrator::RejectReason;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(message: &str, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_string(),
            data: Some(data),
        })
    }
}

fn error_response(message: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            message: message.to_string(),
            data: None,
        }),
    )
}

// ── Prewarm requests ───────────────────────────────────────────

/// Submit request body.
#[derive(serde::Deserialize)]
pub struct PrewarmSubmission {
    pub desired_size: u32,
}

/// POST /api/v1/prewarm
pub async fn submit_prewarm(
    State(state): State<ApiState>,
    Json(body): Json<PrewarmSubmission>,
) -> impl IntoResponse {
    match state.service.submit(body.desired_size).await {
        Ok(id) => ApiResponse::ok(
            "prewarm request accepted",
            serde_json::json!({ "request_id": id }),
        )
        .into_response(),
        Err(reason) => {
            let status = match reason {
                RejectReason::Unavailable(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::BAD_REQUEST,
            };
            error_response(&reason.to_string(), status).into_response()
        }
    }
}

/// GET /api/v1/prewarm/:id
pub async fn get_prewarm(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.service.status(&id).await {
        Some(request) => ApiResponse::ok("ok", request).into_response(),
        None => error_response("prewarm request not found", StatusCode::NOT_FOUND).into_response(),
    }
}

/// DELETE /api/v1/prewarm/:id
pub async fn cancel_prewarm(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if state.service.cancel(&id).await {
        ApiResponse::ok(
            "cancellation requested",
            serde_json::json!({ "request_id": id }),
        )
        .into_response()
    } else {
        error_response(
            "prewarm request not found or already finalized",
            StatusCode::NOT_FOUND,
        )
        .into_response()
    }
}

// ── Pool passthroughs ──────────────────────────────────────────

/// GET /api/v1/pool
pub async fn get_pool(State(state): State<ApiState>) -> impl IntoResponse {
    match state.service.describe_pool().await {
        Ok(pool) => ApiResponse::ok("ok", pool).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::BAD_GATEWAY).into_response(),
    }
}

/// GET /api/v1/pool/ready-nodes
pub async fn get_ready_nodes(State(state): State<ApiState>) -> impl IntoResponse {
    match state.service.ready_node_count().await {
        Ok(count) => ApiResponse::ok("ok", serde_json::json!({ "ready_nodes": count }))
            .into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::BAD_GATEWAY).into_response(),
    }
}

// ── Health ─────────────────────────────────────────────────────

/// GET /health-check
pub async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::<()> {
        success: true,
        message: "ok".to_string(),
        data: None,
    })
}
