use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::json;

use crate::access::AuthState;

use super::domain::{filter_services, filter_users, ListingQuery, RowAction};
use super::service::AdminDashboardService;
use super::source::{DashboardError, DashboardSource};

/// Router builder for the admin overview and row moderation.
pub fn admin_router<D>(service: Arc<AdminDashboardService<D>>) -> Router
where
    D: DashboardSource + 'static,
{
    Router::new()
        .route("/api/v1/admin/dashboard", get(dashboard_handler::<D>))
        .route(
            "/api/v1/admin/users/:user_id/:action",
            post(user_action_handler::<D>),
        )
        .route(
            "/api/v1/admin/services/:service_id/:action",
            post(service_action_handler::<D>),
        )
        .with_state(service)
}

pub(crate) async fn dashboard_handler<D>(
    State(service): State<Arc<AdminDashboardService<D>>>,
    auth: AuthState,
    Query(query): Query<ListingQuery>,
) -> Response
where
    D: DashboardSource + 'static,
{
    if let Err(response) = service.policy().admin_gate(&auth).into_response_result() {
        return response;
    }

    let mut snapshot = service.load(Utc::now());
    snapshot.users = filter_users(&snapshot.users, &query);
    snapshot.services = filter_services(&snapshot.services, &query);
    (StatusCode::OK, axum::Json(snapshot)).into_response()
}

pub(crate) async fn user_action_handler<D>(
    State(service): State<Arc<AdminDashboardService<D>>>,
    auth: AuthState,
    Path((user_id, action)): Path<(String, RowAction)>,
) -> Response
where
    D: DashboardSource + 'static,
{
    if let Err(response) = service.policy().admin_gate(&auth).into_response_result() {
        return response;
    }
    action_response(&user_id, action, service.apply_user_action(&user_id, action))
}

pub(crate) async fn service_action_handler<D>(
    State(service): State<Arc<AdminDashboardService<D>>>,
    auth: AuthState,
    Path((service_id, action)): Path<(String, RowAction)>,
) -> Response
where
    D: DashboardSource + 'static,
{
    if let Err(response) = service.policy().admin_gate(&auth).into_response_result() {
        return response;
    }
    action_response(
        &service_id,
        action,
        service.apply_service_action(&service_id, action),
    )
}

fn action_response(id: &str, action: RowAction, result: Result<(), DashboardError>) -> Response {
    match result {
        Ok(()) => {
            let payload = json!({ "id": id, "action": action.label() });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(DashboardError::NotFound { .. }) => {
            let payload = json!({ "error": format!("'{id}' not found") });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
