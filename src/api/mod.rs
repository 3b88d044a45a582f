//! REST API layer: route handlers, DTOs, the role gate and router
//! composition.
//!
//! All endpoints are mounted at the root. Each protected group is wrapped
//! with [`auth::authorize`] and an [`auth::Access`] requirement.

pub mod auth;
pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::{Router, middleware};

use crate::app_state::AppState;
use crate::domain::Role;
use auth::Access;

/// Wraps a route group with the role gate.
fn gated(state: &AppState, access: Access, routes: Router<AppState>) -> Router<AppState> {
    routes.route_layer(middleware::from_fn_with_state(
        (state.clone(), access),
        auth::authorize,
    ))
}

/// Builds the complete API router with all REST endpoints.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .merge(handlers::public_routes())
        .merge(gated(
            &state,
            Access::Authenticated,
            handlers::accounts::session_routes(),
        ))
        .merge(gated(
            &state,
            Access::Role(Role::Student),
            handlers::student_routes(),
        ))
        .merge(gated(
            &state,
            Access::Role(Role::Tutor),
            handlers::tutor_routes(),
        ))
        .merge(gated(
            &state,
            Access::Role(Role::Admin),
            handlers::admin_routes(),
        ));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router.with_state(state)
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    use super::*;
    use crate::error::AppError;
    use crate::payments::{
        CheckoutRequest, CheckoutSession, PaymentProvider, ProviderSession, SESSION_STATUS_PAID,
    };
    use crate::persistence::Store;
    use crate::service::CheckoutSettings;

    /// Provider that remembers created sessions and reports them back as
    /// paid (or unpaid) on lookup.
    #[derive(Debug)]
    struct ScriptedProvider {
        paid: bool,
        sessions: Mutex<HashMap<String, CheckoutRequest>>,
    }

    #[async_trait]
    impl PaymentProvider for ScriptedProvider {
        async fn create_checkout_session(
            &self,
            request: &CheckoutRequest,
        ) -> Result<CheckoutSession, AppError> {
            let mut sessions = self.sessions.lock().await;
            let id = format!("cs_test_{}", sessions.len() + 1);
            sessions.insert(id.clone(), request.clone());
            Ok(CheckoutSession {
                id,
                url: Some("https://checkout.test/pay".to_string()),
            })
        }

        async fn retrieve_session(&self, session_id: &str) -> Result<ProviderSession, AppError> {
            let sessions = self.sessions.lock().await;
            let request = sessions
                .get(session_id)
                .ok_or_else(|| AppError::not_found("checkout session", session_id))?;
            Ok(ProviderSession {
                id: session_id.to_string(),
                payment_intent: Some(format!("pi_{session_id}")),
                payment_status: if self.paid {
                    SESSION_STATUS_PAID.to_string()
                } else {
                    "unpaid".to_string()
                },
                amount_total: Some(request.line_item.unit_amount),
                currency: Some(request.line_item.currency.clone()),
                customer_email: Some(request.customer_email.clone()),
                metadata: request.metadata.clone(),
            })
        }
    }

    const ADMIN_EMAIL: &str = "admin@example.com";
    const ADMIN_PASSWORD: &str = "admin-secret";

    async fn app(paid: bool) -> Router {
        let provider = Arc::new(ScriptedProvider {
            paid,
            sessions: Mutex::new(HashMap::new()),
        });
        let state = AppState::new(
            Store::in_memory(),
            provider,
            CheckoutSettings {
                client_url: "http://localhost:5173".to_string(),
                currency: "bdt".to_string(),
            },
            chrono::Duration::hours(1),
        );
        tokio_test::assert_ok!(state.accounts.ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await);
        build_router(state)
    }

    async fn send_raw(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let Ok(request) = builder.body(body) else {
            panic!("request should build");
        };
        let Ok(response) = app.clone().oneshot(request).await else {
            panic!("router is infallible");
        };
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body should be readable");
        };
        (status, bytes.to_vec())
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = send_raw(app, method, uri, token, body).await;
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn signup(app: &Router, email: &str, role: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/signup",
            None,
            Some(json!({"name": email, "email": email, "password": "secret1", "role": role})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        let Some(token) = body["token"].as_str() else {
            panic!("signup response should carry a token: {body}");
        };
        token.to_string()
    }

    async fn admin_token(app: &Router) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/login",
            None,
            Some(json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let Some(token) = body["token"].as_str() else {
            panic!("login response should carry a token: {body}");
        };
        token.to_string()
    }

    async fn create_tuition(app: &Router, token: &str, budget: i64) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/student/tuitions",
            Some(token),
            Some(json!({
                "subject": "Math",
                "class_level": "Class 10",
                "location": "Dhanmondi",
                "budget": budget
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        assert_eq!(body["status"], "Pending");
        let Some(id) = body["id"].as_str() else {
            panic!("tuition should have an id: {body}");
        };
        id.to_string()
    }

    async fn approve(app: &Router, admin: &str, tuition_id: &str) {
        let (status, body) = send(
            app,
            Method::PATCH,
            &format!("/admin/tuitions/{tuition_id}/status"),
            Some(admin),
            Some(json!({"status": "Approved"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "approve failed: {body}");
    }

    /// Student posts, admin approves, tutor applies, student opens checkout.
    /// Returns the student token and the checkout session id.
    async fn checkout_flow(app: &Router) -> (String, String) {
        let student = signup(app, "student@example.com", "Student").await;
        let tutor = signup(app, "tutor@example.com", "Tutor").await;
        let admin = admin_token(app).await;

        let tuition_id = create_tuition(app, &student, 5000).await;
        approve(app, &admin, &tuition_id).await;

        let (status, application) = send(
            app,
            Method::POST,
            "/tutor/applications",
            Some(&tutor),
            Some(json!({
                "tuition_id": tuition_id,
                "qualifications": "BSc Mathematics",
                "experience": "3 years",
                "expected_salary": 5000
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "apply failed: {application}");

        let (status, checkout) = send(
            app,
            Method::POST,
            "/payments/checkout-session",
            Some(&student),
            Some(json!({"application_id": application["id"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "checkout failed: {checkout}");
        let Some(session_id) = checkout["session_id"].as_str() else {
            panic!("checkout should return a session id: {checkout}");
        };
        (student, session_id.to_string())
    }

    #[tokio::test]
    async fn server_banner_is_plain_text() {
        let app = app(true).await;
        let (status, bytes) = send_raw(&app, Method::GET, "/server", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"tuition-manager server is running");
    }

    #[tokio::test]
    async fn gate_requires_token_and_exact_role() {
        let app = app(true).await;
        let (status, _) = send(&app, Method::GET, "/student/tuitions", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::GET, "/student/tuitions", Some("nope"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let tutor = signup(&app, "tutor@example.com", "Tutor").await;
        let (status, body) =
            send(&app, Method::GET, "/student/tuitions", Some(&tutor), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], 1201);

        let admin = admin_token(&app).await;
        let (status, _) = send(&app, Method::GET, "/student/tuitions", Some(&admin), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, Method::GET, "/users/me", Some(&tutor), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "Tutor");
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let app = app(true).await;
        let student = signup(&app, "student@example.com", "Student").await;
        let (status, _) = send(&app, Method::POST, "/logout", Some(&student), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, "/users/me", Some(&student), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn tuition_is_public_only_after_approval() {
        let app = app(true).await;
        let student = signup(&app, "student@example.com", "Student").await;
        let admin = admin_token(&app).await;
        let tuition_id = create_tuition(&app, &student, 5000).await;

        let (status, board) = send(&app, Method::GET, "/tuitions", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(board["pagination"]["total"], 0);
        let (status, _) =
            send(&app, Method::GET, &format!("/tuitions/{tuition_id}"), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        approve(&app, &admin, &tuition_id).await;

        let (_, board) = send(&app, Method::GET, "/tuitions", None, None).await;
        assert_eq!(board["pagination"]["total"], 1);
        assert_eq!(board["data"][0]["budget"], 5000);
        assert_eq!(board["data"][0]["status"], "Approved");
    }

    #[tokio::test]
    async fn confirm_is_idempotent_over_http() {
        let app = app(true).await;
        let (student, session_id) = checkout_flow(&app).await;

        let (status, first) = send(
            &app,
            Method::POST,
            "/payments/confirm",
            Some(&student),
            Some(json!({"session_id": session_id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["success"], true);
        assert_eq!(first["status"], "confirmed");
        assert_eq!(first["application_modified"], true);
        assert_eq!(first["payment"]["amount"], 500_000);

        let (status, second) = send(
            &app,
            Method::POST,
            "/payments/confirm",
            Some(&student),
            Some(json!({"session_id": session_id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["success"], false);
        assert_eq!(second["status"], "duplicate");
        assert_eq!(second["transaction_id"], first["transaction_id"]);

        let (_, payments) = send(&app, Method::GET, "/student/payments", Some(&student), None).await;
        assert_eq!(payments["pagination"]["total"], 1);

        let (_, received) =
            send(&app, Method::GET, "/student/applications", Some(&student), None).await;
        assert_eq!(received["data"][0]["status"], "Approved");
    }

    #[tokio::test]
    async fn unpaid_session_writes_nothing() {
        let app = app(false).await;
        let (student, session_id) = checkout_flow(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/payments/confirm",
            Some(&student),
            Some(json!({"session_id": session_id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["status"], "not_paid");

        let (_, payments) = send(&app, Method::GET, "/student/payments", Some(&student), None).await;
        assert_eq!(payments["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn own_tuitions_are_paginated() {
        let app = app(true).await;
        let student = signup(&app, "student@example.com", "Student").await;
        for budget in [3000, 4000, 5000] {
            create_tuition(&app, &student, budget).await;
        }

        let (status, page) = send(
            &app,
            Method::GET,
            "/student/tuitions?page=2&limit=2",
            Some(&student),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["pagination"]["total"], 3);
        assert_eq!(page["pagination"]["total_pages"], 2);
        assert_eq!(page["pagination"]["page"], 2);
        assert_eq!(page["data"].as_array().map(Vec::len), Some(1));
    }
}
