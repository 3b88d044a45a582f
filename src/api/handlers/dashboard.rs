//! Dashboard handlers.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::CurrentUser;
use crate::app_state::AppState;
use crate::error::{AppError, ErrorResponse};
use crate::service::dashboard::{AdminDashboard, StudentDashboard, TutorDashboard};

/// `GET /student/dashboard`
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/student/dashboard",
    tag = "Student",
    summary = "Student totals",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Totals", body = StudentDashboard),
        (status = 403, description = "Students only", body = ErrorResponse),
    )
)]
pub async fn student(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<StudentDashboard>, AppError> {
    Ok(Json(state.dashboard.student(&current.user.email).await?))
}

/// `GET /tutor/dashboard`
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/tutor/dashboard",
    tag = "Tutor",
    summary = "Tutor totals and earnings",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Totals", body = TutorDashboard),
        (status = 403, description = "Tutors only", body = ErrorResponse),
    )
)]
pub async fn tutor(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<TutorDashboard>, AppError> {
    Ok(Json(state.dashboard.tutor(&current.user.email).await?))
}

/// `GET /admin/dashboard`
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "Admin",
    summary = "Platform totals",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Totals", body = AdminDashboard),
        (status = 403, description = "Admins only", body = ErrorResponse),
    )
)]
pub async fn admin(State(state): State<AppState>) -> Result<Json<AdminDashboard>, AppError> {
    Ok(Json(state.dashboard.admin().await?))
}

/// `/student/dashboard`
pub fn student_routes() -> Router<AppState> {
    Router::new().route("/student/dashboard", get(student))
}

/// `/tutor/dashboard`
pub fn tutor_routes() -> Router<AppState> {
    Router::new().route("/tutor/dashboard", get(tutor))
}

/// `/admin/dashboard`
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/dashboard", get(admin))
}
