//! Application handlers: tutor apply/withdraw, student and admin listings,
//! admin rejection.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch};
use axum::{Json, Router};

use crate::api::auth::CurrentUser;
use crate::api::dto::{ApplicationListParams, CreateApplicationRequest, page_request};
use crate::app_state::AppState;
use crate::domain::{ApplicationId, Page, TutorApplication};
use crate::error::{AppError, ErrorResponse};

/// `POST /tutor/applications` — Apply to an approved tuition.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] if the tuition is not approved and
/// [`AppError::Conflict`] if the caller already applied.
#[utoipa::path(
    post,
    path = "/tutor/applications",
    tag = "Tutor",
    summary = "Apply to tuition",
    security(("bearer" = [])),
    request_body = CreateApplicationRequest,
    responses(
        (status = 201, description = "Application submitted", body = TutorApplication),
        (status = 404, description = "Tuition not found", body = ErrorResponse),
        (status = 409, description = "Already applied", body = ErrorResponse),
    )
)]
pub async fn apply(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let application = state.applications.apply(&current.user, req.into()).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// `GET /tutor/applications` — The caller's applications.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/tutor/applications",
    tag = "Tutor",
    summary = "My applications",
    security(("bearer" = [])),
    params(ApplicationListParams),
    responses(
        (status = 200, description = "Own applications", body = Page<TutorApplication>),
    )
)]
pub async fn list_own(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<ApplicationListParams>,
) -> Result<Json<Page<TutorApplication>>, AppError> {
    let page = state
        .applications
        .list_for_tutor(
            &current.user.email,
            params.filter(),
            page_request(params.page, params.limit),
        )
        .await?;
    Ok(Json(page))
}

/// `DELETE /tutor/applications/{id}` — Withdraw a Pending application.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] if not the caller's and
/// [`AppError::Conflict`] once decided.
#[utoipa::path(
    delete,
    path = "/tutor/applications/{id}",
    tag = "Tutor",
    summary = "Withdraw application",
    security(("bearer" = [])),
    params(("id" = uuid::Uuid, Path, description = "Application UUID")),
    responses(
        (status = 204, description = "Application withdrawn"),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 409, description = "Application already decided", body = ErrorResponse),
    )
)]
pub async fn withdraw(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<ApplicationId>,
) -> Result<StatusCode, AppError> {
    state.applications.withdraw(&current.user.email, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /student/applications` — Applications on the caller's tuitions.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/student/applications",
    tag = "Student",
    summary = "Applications received",
    security(("bearer" = [])),
    params(ApplicationListParams),
    responses(
        (status = 200, description = "Applications on own tuitions", body = Page<TutorApplication>),
    )
)]
pub async fn list_received(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<ApplicationListParams>,
) -> Result<Json<Page<TutorApplication>>, AppError> {
    let page = state
        .applications
        .list_for_student(
            &current.user.email,
            params.filter(),
            page_request(params.page, params.limit),
        )
        .await?;
    Ok(Json(page))
}

/// `GET /admin/applications` — Every application.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/admin/applications",
    tag = "Admin",
    summary = "List all applications",
    security(("bearer" = [])),
    params(ApplicationListParams),
    responses(
        (status = 200, description = "Applications", body = Page<TutorApplication>),
    )
)]
pub async fn list_all(
    State(state): State<AppState>,
    Query(params): Query<ApplicationListParams>,
) -> Result<Json<Page<TutorApplication>>, AppError> {
    let page = state
        .applications
        .list_all(params.filter(), page_request(params.page, params.limit))
        .await?;
    Ok(Json(page))
}

/// `PATCH /admin/applications/{id}/reject` — Reject a Pending application.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown id and
/// [`AppError::Conflict`] if it is no longer Pending.
#[utoipa::path(
    patch,
    path = "/admin/applications/{id}/reject",
    tag = "Admin",
    summary = "Reject application",
    security(("bearer" = [])),
    params(("id" = uuid::Uuid, Path, description = "Application UUID")),
    responses(
        (status = 200, description = "Rejected application", body = TutorApplication),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 409, description = "Application already decided", body = ErrorResponse),
    )
)]
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<Json<TutorApplication>, AppError> {
    Ok(Json(state.applications.reject(id).await?))
}

/// Tutor application routes.
pub fn tutor_routes() -> Router<AppState> {
    Router::new()
        .route("/tutor/applications", get(list_own).post(apply))
        .route("/tutor/applications/{id}", delete(withdraw))
}

/// Student view of received applications.
pub fn student_routes() -> Router<AppState> {
    Router::new().route("/student/applications", get(list_received))
}

/// Admin application review.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/applications", get(list_all))
        .route("/admin/applications/{id}/reject", patch(reject))
}
