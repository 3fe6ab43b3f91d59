use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use axum::Router;
use serde_json::json;
use std::sync::Arc;
use waqti::workflows::admin::{admin_router, AdminDashboardService, DashboardSource};
use waqti::workflows::escrow::{escrow_router, EscrowRepository, EscrowService};
use waqti::workflows::saved_searches::{
    saved_search_router, SavedSearchRepository, SavedSearchService,
};
use waqti::workflows::verification::{
    verification_router, FileStorage, VerificationService, VerificationSubmitter,
};

/// Every workflow service the HTTP surface exposes.
pub(crate) struct Workflows<S, F, D, E, Q> {
    pub(crate) verification: Arc<VerificationService<S, F>>,
    pub(crate) admin: Arc<AdminDashboardService<D>>,
    pub(crate) escrow: Arc<EscrowService<E>>,
    pub(crate) saved_searches: Arc<SavedSearchService<Q>>,
}

pub(crate) fn with_workflow_routes<S, F, D, E, Q>(workflows: Workflows<S, F, D, E, Q>) -> Router
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
    D: DashboardSource + 'static,
    E: EscrowRepository + 'static,
    Q: SavedSearchRepository + 'static,
{
    verification_router(workflows.verification)
        .merge(admin_router(workflows.admin))
        .merge(escrow_router(workflows.escrow))
        .merge(saved_search_router(workflows.saved_searches))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
