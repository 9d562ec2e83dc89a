//! poolwarm-api — REST shell over the prewarm service.
//!
//! Thin plumbing only: every handler delegates to
//! [`PrewarmService`] and wraps the outcome in a uniform JSON envelope
//! `{success, message, data?}`.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/api/v1/prewarm` | Submit a prewarm request |
//! | GET | `/api/v1/prewarm/{id}` | Request status snapshot |
//! | DELETE | `/api/v1/prewarm/{id}` | Cancel a request |
//! | GET | `/api/v1/pool` | Pool description (config + readiness) |
//! | GET | `/api/v1/pool/ready-nodes` | Current ready-node count |
//! | GET | `/health-check` | Liveness probe |

pub mod handlers;

use axum::Router;
use axum::routing::{get, post};

use poolwarm_orchestrator::PrewarmService;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub service: PrewarmService,
}

/// Build the complete router (versioned API + health check).
pub fn build_router(service: PrewarmService) -> Router {
    let state = ApiState { service };

    let api_routes = Router::new()
        .route("/prewarm", post(handlers::submit_prewarm))
        .route(
            "/prewarm/{id}",
            get(handlers::get_prewarm).delete(handlers::cancel_prewarm),
        )
        .route("/pool", get(handlers::get_pool))
        .route("/pool/ready-nodes", get(handlers::get_ready_nodes))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health-check", get(handlers::health_check))
}
