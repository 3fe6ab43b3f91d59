use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use chrono::Utc;
use serde_json::json;

use crate::access::{AuthState, CurrentUser};

use super::domain::{NewSavedSearch, SavedSearchUpdate};
use super::repository::{SavedSearchRepository, SearchRepositoryError};
use super::service::{SavedSearchError, SavedSearchService};

pub fn saved_search_router<R>(service: Arc<SavedSearchService<R>>) -> Router
where
    R: SavedSearchRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/saved-searches",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route(
            "/api/v1/saved-searches/:search_id",
            patch(update_handler::<R>).delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/saved-searches/:search_id/notifications",
            post(toggle_handler::<R>),
        )
        .route("/api/v1/saved-searches/:search_id/run", post(run_handler::<R>))
        .with_state(service)
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<SavedSearchService<R>>>,
    auth: AuthState,
) -> Response
where
    R: SavedSearchRepository + 'static,
{
    let user = match require_member(&service, &auth) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match service.list(&user) {
        Ok(listing) => (StatusCode::OK, axum::Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<SavedSearchService<R>>>,
    auth: AuthState,
    axum::Json(request): axum::Json<NewSavedSearch>,
) -> Response
where
    R: SavedSearchRepository + 'static,
{
    let user = match require_member(&service, &auth) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match service.create(&user, request, Utc::now()) {
        Ok(search) => (StatusCode::CREATED, axum::Json(search)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<SavedSearchService<R>>>,
    auth: AuthState,
    Path(search_id): Path<String>,
    axum::Json(update): axum::Json<SavedSearchUpdate>,
) -> Response
where
    R: SavedSearchRepository + 'static,
{
    let user = match require_member(&service, &auth) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match service.update(&user, &search_id, update) {
        Ok(search) => (StatusCode::OK, axum::Json(search)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<SavedSearchService<R>>>,
    auth: AuthState,
    Path(search_id): Path<String>,
) -> Response
where
    R: SavedSearchRepository + 'static,
{
    let user = match require_member(&service, &auth) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match service.delete(&user, &search_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn toggle_handler<R>(
    State(service): State<Arc<SavedSearchService<R>>>,
    auth: AuthState,
    Path(search_id): Path<String>,
) -> Response
where
    R: SavedSearchRepository + 'static,
{
    let user = match require_member(&service, &auth) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match service.toggle_notifications(&user, &search_id) {
        Ok(search) => (StatusCode::OK, axum::Json(search)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn run_handler<R>(
    State(service): State<Arc<SavedSearchService<R>>>,
    auth: AuthState,
    Path(search_id): Path<String>,
) -> Response
where
    R: SavedSearchRepository + 'static,
{
    let user = match require_member(&service, &auth) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match service.run(&user, &search_id, Utc::now()) {
        Ok(run) => (StatusCode::OK, axum::Json(run)).into_response(),
        Err(error) => error_response(error),
    }
}

fn require_member<R>(
    service: &SavedSearchService<R>,
    auth: &AuthState,
) -> Result<CurrentUser, Response>
where
    R: SavedSearchRepository + 'static,
{
    service.policy().member_gate(auth).into_response_result()
}

fn error_response(error: SavedSearchError) -> Response {
    let status = match &error {
        SavedSearchError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SavedSearchError::NotFound(_)
        | SavedSearchError::Repository(SearchRepositoryError::NotFound) => StatusCode::NOT_FOUND,
        SavedSearchError::Repository(SearchRepositoryError::Conflict) => StatusCode::CONFLICT,
        SavedSearchError::Repository(SearchRepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
