//! Checkout creation and payment confirmation.
//!
//! Confirmation is idempotent per provider transaction. The existence
//! check before the insert is only a fast path: the unique constraint on
//! `transaction_id` decides concurrent confirmations, and only the writer
//! that wins the insert approves the application.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    ApplicationField, ApplicationId, ApplicationStatus, Direction, Filter, ListQuery, Page,
    PageRequest, PaymentField, PaymentId, PaymentRecord, TuitionId, TutorApplication, Update,
    User,
};
use crate::error::AppError;
use crate::payments::{
    CheckoutRequest, CheckoutSession, LineItem, PaymentProvider, ProviderSession, metadata_keys,
};
use crate::persistence::{InsertOutcome, Store};
use crate::service::TuitionService;

/// Minor units per whole currency unit.
const MINOR_UNITS: i64 = 100;

/// Where checkout redirects go and what currency is charged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// Frontend base URL, without trailing slash.
    pub client_url: String,
    /// Lowercase ISO currency code.
    pub currency: String,
}

impl CheckoutSettings {
    fn success_url(&self) -> String {
        format!(
            "{}/dashboard/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
            self.client_url.trim_end_matches('/')
        )
    }

    fn cancel_url(&self) -> String {
        format!(
            "{}/dashboard/payment-cancelled",
            self.client_url.trim_end_matches('/')
        )
    }
}

/// Result of [`PaymentService::confirm`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// This call recorded the payment.
    Confirmed {
        /// Whether the application's status actually changed.
        application_modified: bool,
        /// The stored record.
        payment: PaymentRecord,
    },
    /// The transaction was already recorded; nothing was written.
    Duplicate {
        /// Provider transaction id.
        transaction_id: String,
    },
    /// The provider does not report the session as paid; nothing was
    /// written.
    NotPaid,
}

/// Metadata the checkout session was created with, validated.
#[derive(Debug)]
struct SessionMetadata {
    application_id: ApplicationId,
    tuition_id: TuitionId,
    student_email: String,
    tutor_email: String,
}

impl SessionMetadata {
    fn from_session(session: &ProviderSession) -> Result<Self, AppError> {
        let field = |key: &str| {
            session.metadata_value(key).ok_or_else(|| {
                AppError::InvalidRequest(format!("checkout session is missing metadata {key}"))
            })
        };
        let application_id = field(metadata_keys::APPLICATION_ID)?;
        let tuition_id = field(metadata_keys::TUITION_ID)?;
        Ok(Self {
            application_id: ApplicationId::from_str(application_id).map_err(|_| {
                AppError::InvalidRequest(format!("malformed application_id: {application_id}"))
            })?,
            tuition_id: TuitionId::from_str(tuition_id).map_err(|_| {
                AppError::InvalidRequest(format!("malformed tuition_id: {tuition_id}"))
            })?,
            student_email: field(metadata_keys::STUDENT_EMAIL)?.to_lowercase(),
            tutor_email: field(metadata_keys::TUTOR_EMAIL)?.to_lowercase(),
        })
    }
}

/// Payments: checkout, confirmation and history.
#[derive(Debug, Clone)]
pub struct PaymentService {
    store: Store,
    tuitions: TuitionService,
    provider: Arc<dyn PaymentProvider>,
    settings: CheckoutSettings,
}

impl PaymentService {
    /// Creates a new `PaymentService`.
    #[must_use]
    pub fn new(
        store: Store,
        tuitions: TuitionService,
        provider: Arc<dyn PaymentProvider>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            store,
            tuitions,
            provider,
            settings,
        }
    }

    async fn find_application(&self, id: ApplicationId) -> Result<TutorApplication, AppError> {
        self.store
            .applications
            .find_one(&[Filter::eq(ApplicationField::Id, id)])
            .await?
            .ok_or_else(|| AppError::not_found("application", id))
    }

    /// Starts a hosted checkout for a Pending application on one of the
    /// student's tuitions.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the application is not on the
    /// student's tuition, [`AppError::Conflict`] if it is no longer
    /// Pending, and [`AppError::PaymentProvider`] if the provider fails.
    pub async fn create_checkout(
        &self,
        student: &User,
        application_id: ApplicationId,
    ) -> Result<CheckoutSession, AppError> {
        let application = self.find_application(application_id).await?;
        if application.student_email != student.email {
            return Err(AppError::not_found("application", application_id));
        }
        if application.status != ApplicationStatus::Pending {
            return Err(AppError::Conflict(format!(
                "application {application_id} is already {}",
                application.status
            )));
        }
        let tuition = self.tuitions.get(application.tuition_id).await?;
        let unit_amount = tuition.budget.checked_mul(MINOR_UNITS).ok_or_else(|| {
            AppError::InvalidRequest(format!("budget {} is too large to charge", tuition.budget))
        })?;

        let metadata = HashMap::from([
            (
                metadata_keys::APPLICATION_ID.to_string(),
                application.id.to_string(),
            ),
            (metadata_keys::TUITION_ID.to_string(), tuition.id.to_string()),
            (
                metadata_keys::STUDENT_EMAIL.to_string(),
                student.email.clone(),
            ),
            (
                metadata_keys::TUTOR_EMAIL.to_string(),
                application.tutor_email.clone(),
            ),
        ]);
        let request = CheckoutRequest {
            line_item: LineItem {
                name: format!(
                    "{} ({}) with {}",
                    tuition.subject, tuition.class_level, application.tutor_name
                ),
                unit_amount,
                currency: self.settings.currency.clone(),
                quantity: 1,
            },
            customer_email: student.email.clone(),
            success_url: self.settings.success_url(),
            cancel_url: self.settings.cancel_url(),
            metadata,
        };

        let session = self.provider.create_checkout_session(&request).await?;
        tracing::info!(
            session_id = %session.id,
            application_id = %application.id,
            amount = unit_amount,
            "checkout created"
        );
        Ok(session)
    }

    /// Confirms a checkout session for the calling student.
    ///
    /// Only a Pending application is approved. A paid session for an
    /// application decided in the meantime is still recorded, with
    /// `application_modified: false`.
    ///
    /// # Errors
    ///
    /// Provider failures are errors, never "not paid":
    /// [`AppError::PaymentProvider`], or [`AppError::NotFound`] for a
    /// session the provider does not know. Missing or malformed metadata
    /// and a paid session without a transaction id are
    /// [`AppError::InvalidRequest`]. Metadata naming another student is
    /// [`AppError::Forbidden`]. An unknown application is
    /// [`AppError::NotFound`].
    pub async fn confirm(&self, student: &User, session_id: &str) -> Result<ConfirmOutcome, AppError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(AppError::InvalidRequest("session_id is required".to_string()));
        }
        let session = self.provider.retrieve_session(session_id).await?;
        let paid = session.is_paid();

        let transaction_id = match (session.payment_intent.as_deref(), paid) {
            (Some(tx), _) if !tx.trim().is_empty() => tx.to_string(),
            (_, false) => return Ok(ConfirmOutcome::NotPaid),
            (_, true) => {
                return Err(AppError::InvalidRequest(format!(
                    "paid session {session_id} has no payment intent"
                )));
            }
        };

        if self
            .store
            .payments
            .find_one(&[Filter::eq(PaymentField::TransactionId, transaction_id.as_str())])
            .await?
            .is_some()
        {
            tracing::info!(%transaction_id, "duplicate confirmation");
            return Ok(ConfirmOutcome::Duplicate { transaction_id });
        }

        if !paid {
            tracing::debug!(%session_id, status = %session.payment_status, "session not paid");
            return Ok(ConfirmOutcome::NotPaid);
        }

        let metadata = SessionMetadata::from_session(&session)?;
        if metadata.student_email != student.email {
            return Err(AppError::Forbidden(
                "checkout session belongs to another student".to_string(),
            ));
        }
        let application = self.find_application(metadata.application_id).await?;
        if application.tuition_id != metadata.tuition_id {
            return Err(AppError::InvalidRequest(format!(
                "application {} does not belong to tuition {}",
                application.id, metadata.tuition_id
            )));
        }

        let payment = PaymentRecord {
            id: PaymentId::new(),
            transaction_id: transaction_id.clone(),
            amount: session.amount_total.unwrap_or(0),
            currency: session
                .currency
                .clone()
                .unwrap_or_else(|| self.settings.currency.clone()),
            payer_email: metadata.student_email,
            payee_email: metadata.tutor_email,
            application_id: application.id,
            tuition_id: metadata.tuition_id,
            payment_status: session.payment_status.clone(),
            paid_at: Utc::now(),
        };
        if self.store.payments.insert_one(payment.clone()).await? == InsertOutcome::Duplicate {
            tracing::info!(%transaction_id, "duplicate confirmation lost insert race");
            return Ok(ConfirmOutcome::Duplicate { transaction_id });
        }

        let outcome = self
            .store
            .applications
            .update_one(
                &[
                    Filter::eq(ApplicationField::Id, application.id),
                    Filter::eq(ApplicationField::Status, ApplicationStatus::Pending),
                ],
                &Update::new().set(ApplicationField::Status, ApplicationStatus::Approved),
            )
            .await?;
        if outcome.matched == 0 {
            tracing::warn!(
                %transaction_id,
                application_id = %application.id,
                "payment recorded for an application that is no longer pending"
            );
        }
        tracing::info!(
            %transaction_id,
            application_id = %application.id,
            amount = payment.amount,
            currency = %payment.currency,
            "payment recorded"
        );
        Ok(ConfirmOutcome::Confirmed {
            application_modified: outcome.modified > 0,
            payment,
        })
    }

    fn history(page: PageRequest) -> ListQuery<PaymentField> {
        ListQuery::new()
            .sort_by(PaymentField::PaidAt, Direction::Desc)
            .page(page)
    }

    /// Payments made by a student.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on store failure.
    pub async fn list_for_payer(
        &self,
        email: &str,
        page: PageRequest,
    ) -> Result<Page<PaymentRecord>, AppError> {
        let query = Self::history(page).eq(PaymentField::PayerEmail, email);
        self.store.payments.find(&query).await
    }

    /// Payments received by a tutor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on store failure.
    pub async fn list_for_payee(
        &self,
        email: &str,
        page: PageRequest,
    ) -> Result<Page<PaymentRecord>, AppError> {
        let query = Self::history(page).eq(PaymentField::PayeeEmail, email);
        self.store.payments.find(&query).await
    }

    /// Every payment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on store failure.
    pub async fn list_all(&self, page: PageRequest) -> Result<Page<PaymentRecord>, AppError> {
        self.store.payments.find(&Self::history(page)).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::domain::{Role, TuitionStatus};
    use crate::payments::SESSION_STATUS_PAID;
    use crate::service::ApplicationService;
    use crate::service::applications::NewApplication;
    use crate::service::tuitions::NewTuition;

    #[derive(Debug, Default)]
    struct FakeProvider {
        sessions: Mutex<HashMap<String, ProviderSession>>,
        created: Mutex<Vec<CheckoutRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl PaymentProvider for FakeProvider {
        async fn create_checkout_session(
            &self,
            request: &CheckoutRequest,
        ) -> Result<CheckoutSession, AppError> {
            let mut created = self.created.lock().await;
            created.push(request.clone());
            Ok(CheckoutSession {
                id: format!("cs_test_{}", created.len()),
                url: Some("https://checkout.test/pay".to_string()),
            })
        }

        async fn retrieve_session(&self, session_id: &str) -> Result<ProviderSession, AppError> {
            if self.fail {
                return Err(AppError::PaymentProvider("connection refused".to_string()));
            }
            self.sessions
                .lock()
                .await
                .get(session_id)
                .cloned()
                .ok_or_else(|| AppError::not_found("checkout session", session_id))
        }
    }

    struct Fixture {
        svc: PaymentService,
        store: Store,
        provider: Arc<FakeProvider>,
        student: User,
        application: TutorApplication,
    }

    fn user(email: &str, role: Role) -> User {
        User {
            email: email.to_string(),
            name: email.to_string(),
            role,
            phone: None,
            photo_url: None,
            password_hash: String::new(),
            created_at: None,
        }
    }

    async fn fixture(provider: FakeProvider) -> Fixture {
        let store = Store::in_memory();
        let tuitions = TuitionService::new(store.clone());
        let applications = ApplicationService::new(store.clone(), tuitions.clone());
        let student = user("s@example.com", Role::Student);

        let Ok(tuition) = tuitions
            .create(
                &student.email,
                NewTuition {
                    subject: "Math".to_string(),
                    class_level: "Class 10".to_string(),
                    location: "Mirpur".to_string(),
                    budget: 5000,
                    schedule: None,
                    description: None,
                },
            )
            .await
        else {
            panic!("tuition should be created");
        };
        assert!(tuitions.set_status(tuition.id, TuitionStatus::Approved).await.is_ok());
        let Ok(application) = applications
            .apply(
                &user("t@example.com", Role::Tutor),
                NewApplication {
                    tuition_id: tuition.id,
                    qualifications: "MSc".to_string(),
                    experience: "5 years".to_string(),
                    expected_salary: 5000,
                },
            )
            .await
        else {
            panic!("application should be created");
        };

        let provider = Arc::new(provider);
        let svc = PaymentService::new(
            store.clone(),
            tuitions,
            Arc::clone(&provider) as Arc<dyn PaymentProvider>,
            CheckoutSettings {
                client_url: "http://localhost:5173/".to_string(),
                currency: "usd".to_string(),
            },
        );
        Fixture {
            svc,
            store,
            provider,
            student,
            application,
        }
    }

    fn session_for(app: &TutorApplication, status: &str, intent: Option<&str>) -> ProviderSession {
        let metadata = HashMap::from([
            (metadata_keys::APPLICATION_ID.to_string(), app.id.to_string()),
            (metadata_keys::TUITION_ID.to_string(), app.tuition_id.to_string()),
            (metadata_keys::STUDENT_EMAIL.to_string(), app.student_email.clone()),
            (metadata_keys::TUTOR_EMAIL.to_string(), app.tutor_email.clone()),
        ]);
        ProviderSession {
            id: "cs_1".to_string(),
            payment_intent: intent.map(str::to_string),
            payment_status: status.to_string(),
            amount_total: Some(500_000),
            currency: Some("usd".to_string()),
            customer_email: Some(app.student_email.clone()),
            metadata,
        }
    }

    async fn put_session(provider: &FakeProvider, session: ProviderSession) {
        provider
            .sessions
            .lock()
            .await
            .insert(session.id.clone(), session);
    }

    async fn payment_count(store: &Store) -> u64 {
        let Ok(count) = store.payments.count(&[]).await else {
            panic!("count should succeed");
        };
        count
    }

    async fn application_status(f: &Fixture) -> ApplicationStatus {
        let Ok(Some(app)) = f
            .store
            .applications
            .find_one(&[Filter::eq(ApplicationField::Id, f.application.id)])
            .await
        else {
            panic!("application should exist");
        };
        app.status
    }

    #[tokio::test]
    async fn confirm_twice_records_once() {
        let f = fixture(FakeProvider::default()).await;
        put_session(&f.provider, session_for(&f.application, SESSION_STATUS_PAID, Some("pi_1"))).await;

        let Ok(ConfirmOutcome::Confirmed {
            application_modified,
            payment,
        }) = f.svc.confirm(&f.student, "cs_1").await
        else {
            panic!("first confirmation should record the payment");
        };
        assert!(application_modified);
        assert_eq!(payment.transaction_id, "pi_1");
        assert_eq!(payment.amount, 500_000);
        assert_eq!(payment.payee_email, "t@example.com");
        assert_eq!(application_status(&f).await, ApplicationStatus::Approved);

        let Ok(ConfirmOutcome::Duplicate { transaction_id }) = f.svc.confirm(&f.student, "cs_1").await
        else {
            panic!("second confirmation should be a duplicate");
        };
        assert_eq!(transaction_id, "pi_1");
        assert_eq!(payment_count(&f.store).await, 1);
    }

    #[tokio::test]
    async fn payment_after_rejection_keeps_application_rejected() {
        let f = fixture(FakeProvider::default()).await;
        let applications =
            ApplicationService::new(f.store.clone(), TuitionService::new(f.store.clone()));
        assert!(f.svc.create_checkout(&f.student, f.application.id).await.is_ok());
        assert!(applications.reject(f.application.id).await.is_ok());
        put_session(&f.provider, session_for(&f.application, SESSION_STATUS_PAID, Some("pi_late"))).await;

        let Ok(ConfirmOutcome::Confirmed {
            application_modified,
            payment,
        }) = f.svc.confirm(&f.student, "cs_1").await
        else {
            panic!("a paid session should still be recorded");
        };
        assert!(!application_modified);
        assert_eq!(payment.transaction_id, "pi_late");
        assert_eq!(payment_count(&f.store).await, 1);
        assert_eq!(application_status(&f).await, ApplicationStatus::Rejected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_confirmations_record_once() {
        let f = fixture(FakeProvider::default()).await;
        put_session(&f.provider, session_for(&f.application, SESSION_STATUS_PAID, Some("pi_race"))).await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let svc = f.svc.clone();
            let student = f.student.clone();
            handles.push(tokio::spawn(async move { svc.confirm(&student, "cs_1").await }));
        }
        let mut confirmed = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await {
                Ok(Ok(ConfirmOutcome::Confirmed { .. })) => confirmed += 1,
                Ok(Ok(ConfirmOutcome::Duplicate { .. })) => duplicates += 1,
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
        assert_eq!(confirmed, 1);
        assert_eq!(duplicates, 15);
        assert_eq!(payment_count(&f.store).await, 1);
    }

    #[tokio::test]
    async fn unpaid_session_writes_nothing() {
        let f = fixture(FakeProvider::default()).await;
        put_session(&f.provider, session_for(&f.application, "unpaid", Some("pi_2"))).await;
        assert!(matches!(
            f.svc.confirm(&f.student, "cs_1").await,
            Ok(ConfirmOutcome::NotPaid)
        ));
        assert_eq!(payment_count(&f.store).await, 0);
        assert_eq!(application_status(&f).await, ApplicationStatus::Pending);
    }

    #[tokio::test]
    async fn unpaid_session_without_intent_is_not_paid() {
        let f = fixture(FakeProvider::default()).await;
        put_session(&f.provider, session_for(&f.application, "unpaid", None)).await;
        assert!(matches!(
            f.svc.confirm(&f.student, "cs_1").await,
            Ok(ConfirmOutcome::NotPaid)
        ));
    }

    #[tokio::test]
    async fn paid_session_without_intent_is_rejected() {
        let f = fixture(FakeProvider::default()).await;
        put_session(&f.provider, session_for(&f.application, SESSION_STATUS_PAID, None)).await;
        assert!(matches!(
            f.svc.confirm(&f.student, "cs_1").await,
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn missing_metadata_writes_nothing() {
        let f = fixture(FakeProvider::default()).await;
        let mut session = session_for(&f.application, SESSION_STATUS_PAID, Some("pi_3"));
        session.metadata.remove(metadata_keys::TUTOR_EMAIL);
        put_session(&f.provider, session).await;
        assert!(matches!(
            f.svc.confirm(&f.student, "cs_1").await,
            Err(AppError::InvalidRequest(_))
        ));
        assert_eq!(payment_count(&f.store).await, 0);
    }

    #[tokio::test]
    async fn malformed_application_id_is_rejected() {
        let f = fixture(FakeProvider::default()).await;
        let mut session = session_for(&f.application, SESSION_STATUS_PAID, Some("pi_4"));
        session
            .metadata
            .insert(metadata_keys::APPLICATION_ID.to_string(), "not-a-uuid".to_string());
        put_session(&f.provider, session).await;
        assert!(matches!(
            f.svc.confirm(&f.student, "cs_1").await,
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn other_student_is_forbidden() {
        let f = fixture(FakeProvider::default()).await;
        put_session(&f.provider, session_for(&f.application, SESSION_STATUS_PAID, Some("pi_5"))).await;
        let intruder = user("other@example.com", Role::Student);
        assert!(matches!(
            f.svc.confirm(&intruder, "cs_1").await,
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(payment_count(&f.store).await, 0);
    }

    #[tokio::test]
    async fn mismatched_tuition_is_rejected() {
        let f = fixture(FakeProvider::default()).await;
        let mut session = session_for(&f.application, SESSION_STATUS_PAID, Some("pi_6"));
        session
            .metadata
            .insert(metadata_keys::TUITION_ID.to_string(), TuitionId::new().to_string());
        put_session(&f.provider, session).await;
        assert!(matches!(
            f.svc.confirm(&f.student, "cs_1").await,
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn provider_failure_is_not_not_paid() {
        let f = fixture(FakeProvider {
            fail: true,
            ..FakeProvider::default()
        })
        .await;
        assert!(matches!(
            f.svc.confirm(&f.student, "cs_1").await,
            Err(AppError::PaymentProvider(_))
        ));
        assert!(matches!(
            fixture(FakeProvider::default()).await.svc.confirm(&f.student, "cs_unknown").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn checkout_charges_budget_in_minor_units() {
        let f = fixture(FakeProvider::default()).await;
        let Ok(session) = f.svc.create_checkout(&f.student, f.application.id).await else {
            panic!("checkout should be created");
        };
        assert_eq!(session.id, "cs_test_1");

        let created = f.provider.created.lock().await;
        let Some(request) = created.first() else {
            panic!("provider should have been called");
        };
        assert_eq!(request.line_item.unit_amount, 500_000);
        assert_eq!(request.line_item.currency, "usd");
        assert_eq!(
            request.success_url,
            "http://localhost:5173/dashboard/payment-success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(request.cancel_url, "http://localhost:5173/dashboard/payment-cancelled");
        assert_eq!(
            request.metadata.get(metadata_keys::TUTOR_EMAIL).map(String::as_str),
            Some("t@example.com")
        );
    }

    #[tokio::test]
    async fn checkout_requires_pending_owned_application() {
        let f = fixture(FakeProvider::default()).await;
        let intruder = user("other@example.com", Role::Student);
        assert!(matches!(
            f.svc.create_checkout(&intruder, f.application.id).await,
            Err(AppError::NotFound { .. })
        ));

        put_session(&f.provider, session_for(&f.application, SESSION_STATUS_PAID, Some("pi_7"))).await;
        assert!(f.svc.confirm(&f.student, "cs_1").await.is_ok());
        assert!(matches!(
            f.svc.create_checkout(&f.student, f.application.id).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn history_is_scoped_by_party() {
        let f = fixture(FakeProvider::default()).await;
        put_session(&f.provider, session_for(&f.application, SESSION_STATUS_PAID, Some("pi_8"))).await;
        assert!(f.svc.confirm(&f.student, "cs_1").await.is_ok());

        let Ok(paid) = f.svc.list_for_payer("s@example.com", PageRequest::default()).await else {
            panic!("listing should succeed");
        };
        assert_eq!(paid.pagination.total, 1);
        let Ok(received) = f.svc.list_for_payee("s@example.com", PageRequest::default()).await else {
            panic!("listing should succeed");
        };
        assert_eq!(received.pagination.total, 0);
    }
}
