//! # anonpost-api: Axum API Service
//!
//! HTTP surface and collaborator adapters around the submission pipeline.
//!
//! ## API Surface
//!
//! | Route | Module | Purpose |
//! |---|---|---|
//! | `POST /v1/submissions` | [`routes::submissions`] | Verify and commit a comment |
//! | `POST /v1/submissions/recover` | [`routes::submissions`] | Finish a partial commit |
//! | `GET /v1/submissions/{fingerprint}` | [`routes::submissions`] | Fetch a record |
//! | `GET /v1/groups/{propId}/{groupType}` | [`routes::groups`] | Fetch a published group |
//! | `GET /metrics` | | Prometheus exposition |
//! | `GET /health/*` | | Kubernetes probes |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```
//!
//! ## Crate Policy
//!
//! - Route handlers only extract, delegate to [`orchestration`], and map
//!   results; no pipeline logic lives in `routes`.
//! - All errors map to structured HTTP responses via [`AppError`].

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod orchestration;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::submissions::router())
        .merge(routes::groups::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let ops = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(render_metrics))
        .with_state(state);

    Router::new().merge(ops).merge(api)
}

/// Liveness probe. Always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. The verification key and stores are loaded before the
/// listener binds, so a serving process is ready.
async fn readiness() -> &'static str {
    "ready"
}

/// Prometheus text exposition. Empty when no exporter is installed.
async fn render_metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
