use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::json;

use crate::access::AuthState;

use super::domain::{EscrowAction, EscrowFilter};
use super::repository::{EscrowRepository, EscrowRepositoryError};
use super::service::{EscrowError, EscrowService};

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub fn escrow_router<R>(service: Arc<EscrowService<R>>) -> Router
where
    R: EscrowRepository + 'static,
{
    Router::new()
        .route("/api/v1/escrow", get(listing_handler::<R>))
        .route("/api/v1/escrow/export", get(export_handler::<R>))
        .route("/api/v1/escrow/:escrow_id/:action", post(action_handler::<R>))
        .with_state(service)
}

pub(crate) async fn listing_handler<R>(
    State(service): State<Arc<EscrowService<R>>>,
    auth: AuthState,
    Query(filter): Query<EscrowFilter>,
) -> Response
where
    R: EscrowRepository + 'static,
{
    if let Err(response) = service.policy().admin_gate(&auth).into_response_result() {
        return response;
    }
    match service.listing(&filter, Utc::now()) {
        Ok(listing) => (StatusCode::OK, axum::Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_handler<R>(
    State(service): State<Arc<EscrowService<R>>>,
    auth: AuthState,
    Query(filter): Query<EscrowFilter>,
) -> Response
where
    R: EscrowRepository + 'static,
{
    if let Err(response) = service.policy().admin_gate(&auth).into_response_result() {
        return response;
    }
    match service.export(&filter) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, CSV_CONTENT_TYPE),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"escrow.csv\"",
                ),
            ],
            body,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn action_handler<R>(
    State(service): State<Arc<EscrowService<R>>>,
    auth: AuthState,
    Path((escrow_id, action)): Path<(String, EscrowAction)>,
) -> Response
where
    R: EscrowRepository + 'static,
{
    if let Err(response) = service.policy().admin_gate(&auth).into_response_result() {
        return response;
    }
    match service.settle(&escrow_id, action) {
        Ok(item) => (StatusCode::OK, axum::Json(item)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: EscrowError) -> Response {
    let status = match &error {
        EscrowError::NotFound(_) | EscrowError::Repository(EscrowRepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        EscrowError::InvalidTransition { .. } => StatusCode::CONFLICT,
        EscrowError::Repository(EscrowRepositoryError::Unavailable(_))
        | EscrowError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
