//! Account handlers: signup, login, session and admin user management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::auth::CurrentUser;
use crate::api::dto::{
    AuthResponse, LoginRequest, MessageResponse, SearchParams, SignupRequest, UpdateUserRequest,
    UserListParams, page_request,
};
use crate::app_state::AppState;
use crate::domain::{Page, User};
use crate::error::{AppError, ErrorResponse};

/// `POST /signup` — Register a student or tutor.
///
/// # Errors
///
/// Returns [`AppError`] on invalid input or an already registered email.
#[utoipa::path(
    post,
    path = "/signup",
    tag = "Accounts",
    summary = "Register",
    description = "Creates a Student or Tutor account and returns a bearer token. Admin accounts cannot self-register.",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, session) = state.accounts.signup(req.into()).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::new(user, session))))
}

/// `POST /login` — Exchange email and password for a bearer token.
///
/// # Errors
///
/// Returns [`AppError::Unauthorized`] on bad credentials.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Accounts",
    summary = "Log in",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (user, session) = state.accounts.login(&req.email, &req.password).await?;
    Ok(Json(AuthResponse::new(user, session)))
}

/// `GET /users/me` — The caller's profile.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Accounts",
    summary = "Current user",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not signed in", body = ErrorResponse),
    )
)]
pub async fn me(current: CurrentUser) -> Json<User> {
    Json(current.user)
}

/// `POST /logout` — Revoke the caller's token.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Accounts",
    summary = "Log out",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token revoked", body = MessageResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<MessageResponse>, AppError> {
    state.accounts.logout(&current.token).await?;
    Ok(Json(MessageResponse::ok("logged out")))
}

/// `GET /tutors` — Public tutor directory.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/tutors",
    tag = "Accounts",
    summary = "Tutor directory",
    params(SearchParams),
    responses(
        (status = 200, description = "Tutors, newest first", body = Page<User>),
    )
)]
pub async fn list_tutors(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Page<User>>, AppError> {
    let page = state
        .accounts
        .list_tutors(params.search.as_deref(), page_request(params.page, params.limit))
        .await?;
    Ok(Json(page))
}

/// `GET /admin/users` — All users.
///
/// # Errors
///
/// Returns [`AppError`] on store failure.
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    summary = "List users",
    security(("bearer" = [])),
    params(UserListParams),
    responses(
        (status = 200, description = "Users", body = Page<User>),
        (status = 403, description = "Admin only", body = ErrorResponse),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<Json<Page<User>>, AppError> {
    let page = state
        .accounts
        .list_users(
            params.role,
            params.search.as_deref(),
            page_request(params.page, params.limit),
        )
        .await?;
    Ok(Json(page))
}

/// `PATCH /admin/users/{email}` — Update a user's role or profile.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown email.
#[utoipa::path(
    patch,
    path = "/admin/users/{email}",
    tag = "Admin",
    summary = "Update user",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "User email")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "No or invalid changes", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.accounts.update_user(&email, req.into()).await?))
}

/// `DELETE /admin/users/{email}` — Delete a user.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown email.
#[utoipa::path(
    delete,
    path = "/admin/users/{email}",
    tag = "Admin",
    summary = "Delete user",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<StatusCode, AppError> {
    state.accounts.delete_user(&email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unauthenticated account routes.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/tutors", get(list_tutors))
}

/// Routes open to any signed-in user.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(me))
        .route("/logout", post(logout))
}

/// Admin user management.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/{email}", patch(update_user).delete(delete_user))
}
