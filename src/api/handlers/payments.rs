//! Payment handlers: checkout, confirmation and payment history.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::auth::CurrentUser;
use crate::api::dto::{
    CheckoutSessionRequest, CheckoutSessionResponse, ConfirmPaymentRequest,
    ConfirmPaymentResponse, PaginationParams,
};
use crate::app_state::AppState;
use crate::domain::{Page, PaymentRecord};
use crate::error::{AppError, ErrorResponse};

/// `POST /payments/checkout-session` — Start paying for an application.
///
/// # Errors
///
/// Returns [`AppError::Conflict`] if the application is no longer Pending
/// and [`AppError::PaymentProvider`] if the provider fails.
#[utoipa::path(
    post,
    path = "/payments/checkout-session",
    tag = "Payments",
    summary = "Create checkout session",
    description = "Creates a hosted checkout charging the tuition budget for a Pending application on one of the caller's tuitions.",
    security(("bearer" = [])),
    request_body = CheckoutSessionRequest,
    responses(
        (status = 200, description = "Checkout session", body = CheckoutSessionResponse),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 409, description = "Application already decided", body = ErrorResponse),
        (status = 502, description = "Payment provider unavailable", body = ErrorResponse),
    )
)]
pub async fn create_checkout(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<CheckoutSessionRequest>,
) -> Result<Json<CheckoutSessionResponse>, AppError> {
    let session = state
        .payments
        .create_checkout(&current.user, req.application_id)
        .await?;
    Ok(Json(CheckoutSessionResponse {
        session_id: session.id,
        url: session.url,
    }))
}

/// `POST /payments/confirm` — Record a paid checkout session.
///
/// Idempotent per provider transaction: repeated calls report
/// `duplicate` and write nothing.
///
/// # Errors
///
/// Returns [`AppError`] for provider failures, malformed session metadata
/// or a session belonging to another student.
#[utoipa::path(
    post,
    path = "/payments/confirm",
    tag = "Payments",
    summary = "Confirm payment",
    description = "Retrieves the checkout session from the provider and, if paid, records the payment and approves the application. Returns 200 with status `confirmed`, `duplicate` or `not_paid`.",
    security(("bearer" = [])),
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Confirmation outcome", body = ConfirmPaymentResponse),
        (status = 400, description = "Malformed session", body = ErrorResponse),
        (status = 403, description = "Session belongs to another student", body = ErrorResponse),
        (status = 404, description = "Session or application not found", body = ErrorResponse),
        (status = 502, description = "Payment provider unavailable", body = ErrorResponse),
    )
)]
pub async fn confirm(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<ConfirmPaymentResponse>, AppError> {
    let outcome = state.payments.confirm(&current.user, &req.session_id).await?;
    Ok(Json(outcome.into()))
}

/// `GET /student/payments` — Payments made by the caller.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/student/payments",
    tag = "Student",
    summary = "My payments",
    security(("bearer" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Payments made", body = Page<PaymentRecord>),
    )
)]
pub async fn list_paid(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Page<PaymentRecord>>, AppError> {
    let page = state
        .payments
        .list_for_payer(&current.user.email, params.page_request())
        .await?;
    Ok(Json(page))
}

/// `GET /tutor/payments` — Payments received by the caller.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/tutor/payments",
    tag = "Tutor",
    summary = "Payments received",
    security(("bearer" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Payments received", body = Page<PaymentRecord>),
    )
)]
pub async fn list_received(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Page<PaymentRecord>>, AppError> {
    let page = state
        .payments
        .list_for_payee(&current.user.email, params.page_request())
        .await?;
    Ok(Json(page))
}

/// `GET /admin/payments` — Every payment.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/admin/payments",
    tag = "Admin",
    summary = "List all payments",
    security(("bearer" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Payments", body = Page<PaymentRecord>),
    )
)]
pub async fn list_all(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Page<PaymentRecord>>, AppError> {
    Ok(Json(state.payments.list_all(params.page_request()).await?))
}

/// Student checkout, confirmation and history.
pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/payments/checkout-session", post(create_checkout))
        .route("/payments/confirm", post(confirm))
        .route("/student/payments", get(list_paid))
}

/// Tutor earnings history.
pub fn tutor_routes() -> Router<AppState> {
    Router::new().route("/tutor/payments", get(list_received))
}

/// Admin payment ledger.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/payments", get(list_all))
}
