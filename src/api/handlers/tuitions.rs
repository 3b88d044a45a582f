//! Tuition handlers: public board, student CRUD and admin review.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::api::auth::CurrentUser;
use crate::api::dto::{
    CreateTuitionRequest, TuitionBoardParams, TuitionListParams, UpdateTuitionRequest,
    UpdateTuitionStatusRequest, page_request,
};
use crate::app_state::AppState;
use crate::domain::{Page, TuitionId, TuitionRequest};
use crate::error::{AppError, ErrorResponse};

/// `GET /tuitions` — Approved tuitions.
///
/// # Errors
///
/// Returns [`AppError::InvalidRequest`] for an inverted budget range.
#[utoipa::path(
    get,
    path = "/tuitions",
    tag = "Tuitions",
    summary = "Browse approved tuitions",
    description = "Searches, filters, sorts and paginates the Approved tuition board.",
    params(TuitionBoardParams),
    responses(
        (status = 200, description = "Approved tuitions", body = Page<TuitionRequest>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
    )
)]
pub async fn list_public(
    State(state): State<AppState>,
    Query(params): Query<TuitionBoardParams>,
) -> Result<Json<Page<TuitionRequest>>, AppError> {
    let page = state
        .tuitions
        .list_public(&params.filter(), page_request(params.page, params.limit))
        .await?;
    Ok(Json(page))
}

/// `GET /tuitions/{id}` — One approved tuition.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] if missing or not yet approved.
#[utoipa::path(
    get,
    path = "/tuitions/{id}",
    tag = "Tuitions",
    summary = "Get approved tuition",
    params(("id" = uuid::Uuid, Path, description = "Tuition UUID")),
    responses(
        (status = 200, description = "Tuition", body = TuitionRequest),
        (status = 404, description = "Tuition not found", body = ErrorResponse),
    )
)]
pub async fn get_public(
    State(state): State<AppState>,
    Path(id): Path<TuitionId>,
) -> Result<Json<TuitionRequest>, AppError> {
    Ok(Json(state.tuitions.get_public(id).await?))
}

/// `POST /student/tuitions` — Post a tuition request.
///
/// # Errors
///
/// Returns [`AppError::InvalidRequest`] on invalid input.
#[utoipa::path(
    post,
    path = "/student/tuitions",
    tag = "Student",
    summary = "Create tuition",
    description = "Creates a tuition request in Pending status, awaiting admin approval.",
    security(("bearer" = [])),
    request_body = CreateTuitionRequest,
    responses(
        (status = 201, description = "Tuition created", body = TuitionRequest),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<CreateTuitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tuition = state.tuitions.create(&current.user.email, req.into()).await?;
    Ok((StatusCode::CREATED, Json(tuition)))
}

/// `GET /student/tuitions` — The caller's tuitions.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/student/tuitions",
    tag = "Student",
    summary = "My tuitions",
    security(("bearer" = [])),
    params(TuitionListParams),
    responses(
        (status = 200, description = "Own tuitions", body = Page<TuitionRequest>),
    )
)]
pub async fn list_own(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<TuitionListParams>,
) -> Result<Json<Page<TuitionRequest>>, AppError> {
    let page = state
        .tuitions
        .list_for_student(
            &current.user.email,
            params.status,
            page_request(params.page, params.limit),
        )
        .await?;
    Ok(Json(page))
}

/// `PATCH /student/tuitions/{id}` — Edit a Pending tuition.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] if not the caller's and
/// [`AppError::Conflict`] once approved.
#[utoipa::path(
    patch,
    path = "/student/tuitions/{id}",
    tag = "Student",
    summary = "Edit tuition",
    security(("bearer" = [])),
    params(("id" = uuid::Uuid, Path, description = "Tuition UUID")),
    request_body = UpdateTuitionRequest,
    responses(
        (status = 200, description = "Updated tuition", body = TuitionRequest),
        (status = 404, description = "Tuition not found", body = ErrorResponse),
        (status = 409, description = "Tuition is no longer pending", body = ErrorResponse),
    )
)]
pub async fn update_own(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<TuitionId>,
    Json(req): Json<UpdateTuitionRequest>,
) -> Result<Json<TuitionRequest>, AppError> {
    let tuition = state
        .tuitions
        .update_own(&current.user.email, id, req.into())
        .await?;
    Ok(Json(tuition))
}

/// `DELETE /student/tuitions/{id}` — Delete a Pending tuition.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] if not the caller's and
/// [`AppError::Conflict`] once approved.
#[utoipa::path(
    delete,
    path = "/student/tuitions/{id}",
    tag = "Student",
    summary = "Delete tuition",
    security(("bearer" = [])),
    params(("id" = uuid::Uuid, Path, description = "Tuition UUID")),
    responses(
        (status = 204, description = "Tuition deleted"),
        (status = 404, description = "Tuition not found", body = ErrorResponse),
        (status = 409, description = "Tuition is no longer pending", body = ErrorResponse),
    )
)]
pub async fn delete_own(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<TuitionId>,
) -> Result<StatusCode, AppError> {
    state.tuitions.delete_own(&current.user.email, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /admin/tuitions` — Every tuition.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/admin/tuitions",
    tag = "Admin",
    summary = "List all tuitions",
    security(("bearer" = [])),
    params(TuitionListParams),
    responses(
        (status = 200, description = "Tuitions", body = Page<TuitionRequest>),
    )
)]
pub async fn list_all(
    State(state): State<AppState>,
    Query(params): Query<TuitionListParams>,
) -> Result<Json<Page<TuitionRequest>>, AppError> {
    let page = state
        .tuitions
        .list_all(
            params.status,
            params.search.as_deref(),
            page_request(params.page, params.limit),
        )
        .await?;
    Ok(Json(page))
}

/// `PATCH /admin/tuitions/{id}/status` — Approve a tuition.
///
/// # Errors
///
/// Returns [`AppError::InvalidRequest`] for a `Pending` body,
/// [`AppError::NotFound`] for an unknown id and [`AppError::Conflict`]
/// once the tuition is already Approved.
#[utoipa::path(
    patch,
    path = "/admin/tuitions/{id}/status",
    tag = "Admin",
    summary = "Set tuition status",
    security(("bearer" = [])),
    params(("id" = uuid::Uuid, Path, description = "Tuition UUID")),
    request_body = UpdateTuitionStatusRequest,
    responses(
        (status = 200, description = "Updated tuition", body = TuitionRequest),
        (status = 400, description = "Tuitions cannot return to Pending", body = ErrorResponse),
        (status = 404, description = "Tuition not found", body = ErrorResponse),
        (status = 409, description = "Tuition already approved", body = ErrorResponse),
    )
)]
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<TuitionId>,
    Json(req): Json<UpdateTuitionStatusRequest>,
) -> Result<Json<TuitionRequest>, AppError> {
    Ok(Json(state.tuitions.set_status(id, req.status).await?))
}

/// Public tuition board.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/tuitions", get(list_public))
        .route("/tuitions/{id}", get(get_public))
}

/// Student-owned tuition CRUD.
pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/student/tuitions", get(list_own).post(create))
        .route("/student/tuitions/{id}", patch(update_own).delete(delete_own))
}

/// Admin tuition review.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/tuitions", get(list_all))
        .route("/admin/tuitions/{id}/status", patch(set_status))
}
