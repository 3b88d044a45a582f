//! Account DTOs: signup, login and admin user management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{AuthSession, Role, User};
use crate::service::accounts::{NewAccount, UserChanges};

fn default_role() -> Role {
    Role::Student
}

/// Request body for `POST /signup`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Password (at least 6 characters).
    pub password: String,
    /// `Student` (default) or `Tutor`.
    #[serde(default = "default_role")]
    pub role: Role,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Profile photo URL.
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl From<SignupRequest> for NewAccount {
    fn from(req: SignupRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            role: req.role,
            phone: req.phone,
            photo_url: req.photo_url,
        }
    }
}

/// Request body for `POST /login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Response body for signup and login.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: User,
}

impl AuthResponse {
    /// Pairs a user with the session just issued for them.
    #[must_use]
    pub fn new(user: User, session: AuthSession) -> Self {
        Self {
            token: session.token,
            expires_at: session.expires_at,
            user,
        }
    }
}

/// Query parameters for `GET /admin/users`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListParams {
    /// Only users with this role.
    pub role: Option<Role>,
    /// Case-insensitive substring matched against name and email.
    pub search: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page (max 100).
    pub limit: Option<u32>,
}

/// Request body for `PATCH /admin/users/{email}`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New role.
    #[serde(default)]
    pub role: Option<Role>,
    /// New phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// New photo URL.
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            name: req.name,
            role: req.role,
            phone: req.phone,
            photo_url: req.photo_url,
        }
    }
}
