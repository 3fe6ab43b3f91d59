use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, patch, post},
    Router,
};
use mime::Mime;
use serde::Deserialize;
use serde_json::json;

use crate::access::{AuthState, CurrentUser};

use super::attachments::AttachmentError;
use super::controller::{StepPatch, WizardError, SUBMISSION_FAILED_MESSAGE};
use super::domain::{Testimonial, UserId};
use super::repository::{FileStorage, VerificationSubmitter};
use super::service::{VerificationService, VerificationServiceError, WizardView};

pub const FILE_NAME_HEADER: &str = "x-file-name";

/// Router builder exposing the wizard over HTTP, one session per signed-in caller.
pub fn verification_router<S, F>(service: Arc<VerificationService<S, F>>) -> Router
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    Router::new()
        .route(
            "/api/v1/verification/session",
            post(open_handler::<S, F>)
                .get(view_handler::<S, F>)
                .delete(discard_handler::<S, F>),
        )
        .route("/api/v1/verification/steps", patch(update_handler::<S, F>))
        .route("/api/v1/verification/skills", post(add_skill_handler::<S, F>))
        .route(
            "/api/v1/verification/skills/:skill",
            delete(remove_skill_handler::<S, F>),
        )
        .route(
            "/api/v1/verification/gallery/:slot/thumbnail",
            post(thumbnail_handler::<S, F>),
        )
        .route(
            "/api/v1/verification/gallery/:slot/images",
            post(portfolio_image_handler::<S, F>),
        )
        .route(
            "/api/v1/verification/gallery/certificates",
            post(certificate_handler::<S, F>),
        )
        .route(
            "/api/v1/verification/gallery/testimonials",
            post(testimonial_handler::<S, F>),
        )
        .route(
            "/api/v1/verification/admission/complete",
            post(complete_admission_handler::<S, F>),
        )
        .route("/api/v1/verification/advance", post(advance_handler::<S, F>))
        .route("/api/v1/verification/retreat", post(retreat_handler::<S, F>))
        .route("/api/v1/verification/goto/:step", post(goto_handler::<S, F>))
        .route(
            "/api/v1/verification/error",
            delete(dismiss_error_handler::<S, F>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SkillRequest {
    skill: String,
}

pub(crate) async fn open_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    let user = match require_member(&service, &auth) {
        Ok(user) => user,
        Err(response) => return response,
    };
    respond(service.open(&user))
}

pub(crate) async fn view_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    with_user(&service, &auth, |user_id| service.view(user_id))
}

pub(crate) async fn discard_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    let user = match require_member(&service, &auth) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match service.discard(&UserId(user.id)) {
        Ok(released) => (
            StatusCode::OK,
            axum::Json(json!({ "discarded": true, "released_previews": released })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
    axum::Json(patch): axum::Json<StepPatch>,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    with_user(&service, &auth, |user_id| service.update(user_id, patch))
}

pub(crate) async fn add_skill_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
    axum::Json(request): axum::Json<SkillRequest>,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    with_user(&service, &auth, |user_id| {
        service.add_skill(user_id, &request.skill)
    })
}

pub(crate) async fn remove_skill_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
    Path(skill): Path<String>,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    with_user(&service, &auth, |user_id| service.remove_skill(user_id, &skill))
}

pub(crate) async fn thumbnail_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
    Path(slot): Path<usize>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    let (file_name, content_type) = match upload_metadata(&headers) {
        Ok(metadata) => metadata,
        Err(response) => return response,
    };
    with_user(&service, &auth, |user_id| {
        service.attach_thumbnail(user_id, slot, &file_name, content_type, body.to_vec())
    })
}

pub(crate) async fn portfolio_image_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
    Path(slot): Path<usize>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    let (file_name, content_type) = match upload_metadata(&headers) {
        Ok(metadata) => metadata,
        Err(response) => return response,
    };
    with_user(&service, &auth, |user_id| {
        service.add_portfolio_image(user_id, slot, &file_name, content_type, body.to_vec())
    })
}

pub(crate) async fn certificate_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    let (file_name, content_type) = match upload_metadata(&headers) {
        Ok(metadata) => metadata,
        Err(response) => return response,
    };
    with_user(&service, &auth, |user_id| {
        service.add_certificate(user_id, &file_name, content_type, body.to_vec())
    })
}

pub(crate) async fn testimonial_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
    axum::Json(testimonial): axum::Json<Testimonial>,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    with_user(&service, &auth, |user_id| {
        service.add_testimonial(user_id, testimonial)
    })
}

pub(crate) async fn complete_admission_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    with_user(&service, &auth, |user_id| service.complete_admission(user_id))
}

pub(crate) async fn advance_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    with_user(&service, &auth, |user_id| service.advance(user_id))
}

pub(crate) async fn retreat_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    with_user(&service, &auth, |user_id| service.retreat(user_id))
}

pub(crate) async fn goto_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
    Path(step): Path<u8>,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    with_user(&service, &auth, |user_id| service.go_to_step(user_id, step))
}

pub(crate) async fn dismiss_error_handler<S, F>(
    State(service): State<Arc<VerificationService<S, F>>>,
    auth: AuthState,
) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    with_user(&service, &auth, |user_id| service.dismiss_error(user_id))
}

fn require_member<S, F>(
    service: &VerificationService<S, F>,
    auth: &AuthState,
) -> Result<CurrentUser, Response>
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
{
    service.policy().member_gate(auth).into_response_result()
}

fn with_user<S, F, A>(service: &VerificationService<S, F>, auth: &AuthState, action: A) -> Response
where
    S: VerificationSubmitter + 'static,
    F: FileStorage + 'static,
    A: FnOnce(&UserId) -> Result<WizardView, VerificationServiceError>,
{
    match require_member(service, auth) {
        Ok(user) => respond(action(&UserId(user.id))),
        Err(response) => response,
    }
}

fn upload_metadata(headers: &HeaderMap) -> Result<(String, Mime), Response> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Mime>().ok());
    let Some(content_type) = content_type else {
        let payload = json!({ "error": "uploads need a valid content-type header" });
        return Err((StatusCode::UNSUPPORTED_MEDIA_TYPE, axum::Json(payload)).into_response());
    };

    let file_name = headers
        .get(FILE_NAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("upload")
        .to_string();
    Ok((file_name, content_type))
}

fn respond(result: Result<WizardView, VerificationServiceError>) -> Response {
    match result {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: VerificationServiceError) -> Response {
    let status = match &error {
        VerificationServiceError::NoSession(_) => StatusCode::NOT_FOUND,
        VerificationServiceError::Attachment(AttachmentError::UnsupportedType { .. }) => {
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        }
        VerificationServiceError::Attachment(AttachmentError::Empty(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        VerificationServiceError::Wizard(WizardError::Frozen(_) | WizardError::AdmissionLocked) => {
            StatusCode::CONFLICT
        }
        VerificationServiceError::Wizard(
            WizardError::Submission(_) | WizardError::Storage(_),
        ) => StatusCode::BAD_GATEWAY,
        VerificationServiceError::Wizard(_) => StatusCode::UNPROCESSABLE_ENTITY,
        VerificationServiceError::SessionsUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = if status == StatusCode::BAD_GATEWAY {
        json!({ "error": SUBMISSION_FAILED_MESSAGE, "detail": error.to_string() })
    } else {
        json!({ "error": error.to_string() })
    };
    (status, axum::Json(payload)).into_response()
}
