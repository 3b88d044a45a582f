//! OpenAPI documentation.
//!
//! [`ApiDoc`] aggregates every `#[utoipa::path]` handler and declares the
//! bearer security scheme used by gated routes. With the `swagger-ui`
//! feature the document is served at `/api-docs/openapi.json`.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::dto::{ConfirmPaymentResponse, ConfirmStatus, MessageResponse};
use crate::api::handlers::{accounts, applications, dashboard, payments, system, tuitions};
use crate::domain::{
    ApplicationStatus, PaginationMeta, PaymentRecord, Role, TuitionRequest, TuitionStatus,
    TutorApplication, User,
};
use crate::error::{ErrorBody, ErrorResponse};

/// Adds the bearer token security scheme.
#[derive(Debug)]
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(Debug, OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "tuition-manager API",
        description = "Tuition marketplace: tuition requests, tutor applications, admin review and checkout payments."
    ),
    paths(
        system::health_handler,
        system::server_banner,
        accounts::signup,
        accounts::login,
        accounts::me,
        accounts::logout,
        accounts::list_tutors,
        accounts::list_users,
        accounts::update_user,
        accounts::delete_user,
        tuitions::list_public,
        tuitions::get_public,
        tuitions::create,
        tuitions::list_own,
        tuitions::update_own,
        tuitions::delete_own,
        tuitions::list_all,
        tuitions::set_status,
        applications::apply,
        applications::list_own,
        applications::withdraw,
        applications::list_received,
        applications::list_all,
        applications::reject,
        payments::create_checkout,
        payments::confirm,
        payments::list_paid,
        payments::list_received,
        payments::list_all,
        dashboard::student,
        dashboard::tutor,
        dashboard::admin,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        MessageResponse,
        ConfirmPaymentResponse,
        ConfirmStatus,
        PaginationMeta,
        User,
        Role,
        TuitionRequest,
        TuitionStatus,
        TutorApplication,
        ApplicationStatus,
        PaymentRecord,
    )),
    tags(
        (name = "System", description = "Health and liveness"),
        (name = "Accounts", description = "Signup, login and sessions"),
        (name = "Tuitions", description = "Public tuition board"),
        (name = "Student", description = "Student-only operations"),
        (name = "Tutor", description = "Tutor-only operations"),
        (name = "Payments", description = "Checkout and confirmation"),
        (name = "Admin", description = "Admin review and management"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_gated_routes_and_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/payments/confirm"));
        assert!(doc.paths.paths.contains_key("/admin/users/{email}"));
        let has_bearer = doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer"));
        assert!(has_bearer);
    }
}
