//! Bearer-token authentication and the declarative role gate.
//!
//! Every protected route group is wrapped with [`authorize`], carrying the
//! group's [`Access`] requirement in the middleware state. Handlers take
//! [`CurrentUser`] to read the resolved caller.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::app_state::AppState;
use crate::domain::{Role, User};
use crate::error::AppError;

/// Requirement attached to a route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any signed-in user.
    Authenticated,
    /// Exactly this role.
    Role(Role),
}

impl Access {
    /// Checks a resolved user against the requirement.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] when the role does not match.
    pub fn check(self, user: &User) -> Result<(), AppError> {
        match self {
            Self::Authenticated => Ok(()),
            Self::Role(role) if user.role == role => Ok(()),
            Self::Role(role) => Err(AppError::Forbidden(format!(
                "route requires role {role}"
            ))),
        }
    }
}

/// The authenticated caller, inserted by [`authorize`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The caller's account as currently stored.
    pub user: User,
    /// The bearer token used for this request.
    pub token: String,
}

/// Extracts the token from `Authorization: Bearer <token>`.
///
/// # Errors
///
/// Returns [`AppError::Unauthorized`] when the header is missing or not a
/// bearer credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("malformed authorization header".to_string()))?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or_else(|| AppError::Unauthorized("malformed authorization header".to_string()))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AppError::Unauthorized(
            "malformed authorization header".to_string(),
        ));
    }
    Ok(token)
}

/// Role gate middleware.
///
/// Resolves the bearer token, checks the group's [`Access`] and inserts
/// [`CurrentUser`]. A rejected request never reaches the handler.
///
/// # Errors
///
/// Returns [`AppError::Unauthorized`] for a missing, unknown or expired
/// token, and [`AppError::Forbidden`] for a role mismatch.
pub async fn authorize(
    State((state, access)): State<(AppState, Access)>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())?.to_string();
    let user = state.accounts.authenticate(&token).await?;
    if let Err(err) = access.check(&user) {
        tracing::debug!(email = %user.email, role = %user.role, ?access, "role gate rejected request");
        return Err(err);
    }
    req.extensions_mut().insert(CurrentUser { user, token });
    Ok(next.run(req).await)
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::Internal("route is not behind the role gate".to_string()))
    }
}
