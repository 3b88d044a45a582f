//! REST endpoint handlers organized by resource.
//!
//! Each module exposes one route function per access level; the router in
//! [`crate::api`] wraps each group with its gate.

pub mod accounts;
pub mod applications;
pub mod dashboard;
pub mod payments;
pub mod system;
pub mod tuitions;

use axum::Router;

use crate::app_state::AppState;

/// Routes that need no token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .merge(system::routes())
        .merge(accounts::public_routes())
        .merge(tuitions::public_routes())
}

/// Routes for Students.
pub fn student_routes() -> Router<AppState> {
    Router::new()
        .merge(tuitions::student_routes())
        .merge(applications::student_routes())
        .merge(payments::student_routes())
        .merge(dashboard::student_routes())
}

/// Routes for Tutors.
pub fn tutor_routes() -> Router<AppState> {
    Router::new()
        .merge(applications::tutor_routes())
        .merge(payments::tutor_routes())
        .merge(dashboard::tutor_routes())
}

/// Routes for Admins.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .merge(accounts::admin_routes())
        .merge(tuitions::admin_routes())
        .merge(applications::admin_routes())
        .merge(payments::admin_routes())
        .merge(dashboard::admin_routes())
}
