//! Tutor applications: apply, withdraw, list and admin rejection.
//!
//! Approval is not here; an application only becomes Approved through a
//! confirmed payment (see [`super::PaymentService::confirm`]).

use chrono::Utc;

use crate::domain::{
    ApplicationField, ApplicationId, ApplicationStatus, Direction, Filter, ListQuery, Page,
    PageRequest, TuitionId, TuitionStatus, TutorApplication, Update, User,
};
use crate::error::AppError;
use crate::persistence::{InsertOutcome, Store};
use crate::service::TuitionService;

/// Input for a new application.
#[derive(Debug, Clone)]
pub struct NewApplication {
    /// Tuition to apply to; must be Approved.
    pub tuition_id: TuitionId,
    /// Degrees, certificates.
    pub qualifications: String,
    /// Teaching experience.
    pub experience: String,
    /// Expected monthly salary in whole currency units.
    pub expected_salary: i64,
}

/// Listing filter for applications.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationFilter {
    /// Only this status.
    pub status: Option<ApplicationStatus>,
    /// Only applications to this tuition.
    pub tuition_id: Option<TuitionId>,
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Tutor application workflows.
#[derive(Debug, Clone)]
pub struct ApplicationService {
    store: Store,
    tuitions: TuitionService,
}

impl ApplicationService {
    /// Creates a new `ApplicationService`.
    #[must_use]
    pub fn new(store: Store, tuitions: TuitionService) -> Self {
        Self { store, tuitions }
    }

    fn query(filter: ApplicationFilter, page: PageRequest) -> ListQuery<ApplicationField> {
        ListQuery::new()
            .eq_opt(ApplicationField::Status, filter.status)
            .eq_opt(ApplicationField::TuitionId, filter.tuition_id)
            .sort_by(ApplicationField::CreatedAt, Direction::Desc)
            .page(page)
    }

    /// Submits an application against an Approved tuition.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the tuition is missing or not yet
    /// approved, [`AppError::Conflict`] if the tutor already applied, and
    /// [`AppError::InvalidRequest`] on invalid input.
    pub async fn apply(
        &self,
        tutor: &User,
        input: NewApplication,
    ) -> Result<TutorApplication, AppError> {
        if input.expected_salary <= 0 {
            return Err(AppError::InvalidRequest(
                "expected_salary must be greater than zero".to_string(),
            ));
        }
        let qualifications = required("qualifications", &input.qualifications)?;
        let experience = required("experience", &input.experience)?;

        let tuition = self.tuitions.get(input.tuition_id).await?;
        if tuition.status != TuitionStatus::Approved {
            return Err(AppError::not_found("tuition", tuition.id));
        }

        let application = TutorApplication {
            id: ApplicationId::new(),
            tuition_id: tuition.id,
            tutor_email: tutor.email.clone(),
            tutor_name: tutor.name.clone(),
            student_email: tuition.student_email,
            qualifications,
            experience,
            expected_salary: input.expected_salary,
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        };
        if self.store.applications.insert_one(application.clone()).await?
            == InsertOutcome::Duplicate
        {
            return Err(AppError::Conflict(format!(
                "already applied to tuition {}",
                tuition.id
            )));
        }
        tracing::info!(
            application_id = %application.id,
            tuition_id = %application.tuition_id,
            tutor = %application.tutor_email,
            "application submitted"
        );
        Ok(application)
    }

    /// Looks up one application.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if missing.
    pub async fn get(&self, id: ApplicationId) -> Result<TutorApplication, AppError> {
        self.store
            .applications
            .find_one(&[Filter::eq(ApplicationField::Id, id)])
            .await?
            .ok_or_else(|| AppError::not_found("application", id))
    }

    /// A tutor's own applications.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on store failure.
    pub async fn list_for_tutor(
        &self,
        tutor_email: &str,
        filter: ApplicationFilter,
        page: PageRequest,
    ) -> Result<Page<TutorApplication>, AppError> {
        let query = Self::query(filter, page).eq(ApplicationField::TutorEmail, tutor_email);
        self.store.applications.find(&query).await
    }

    /// Applications received on a student's tuitions.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on store failure.
    pub async fn list_for_student(
        &self,
        student_email: &str,
        filter: ApplicationFilter,
        page: PageRequest,
    ) -> Result<Page<TutorApplication>, AppError> {
        let query = Self::query(filter, page).eq(ApplicationField::StudentEmail, student_email);
        self.store.applications.find(&query).await
    }

    /// Every application, for admin review.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on store failure.
    pub async fn list_all(
        &self,
        filter: ApplicationFilter,
        page: PageRequest,
    ) -> Result<Page<TutorApplication>, AppError> {
        self.store.applications.find(&Self::query(filter, page)).await
    }

    async fn not_pending_error(&self, id: ApplicationId, owner: Option<&str>) -> AppError {
        match self.get(id).await {
            Ok(app) if owner.is_none_or(|email| email == app.tutor_email) => {
                AppError::Conflict(format!("application {id} is already {}", app.status))
            }
            Ok(_) | Err(AppError::NotFound { .. }) => AppError::not_found("application", id),
            Err(other) => other,
        }
    }

    /// Withdraws (deletes) the tutor's own Pending application.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if it is not the tutor's, and
    /// [`AppError::Conflict`] once it has been decided.
    pub async fn withdraw(&self, tutor_email: &str, id: ApplicationId) -> Result<(), AppError> {
        let deleted = self
            .store
            .applications
            .delete_one(&[
                Filter::eq(ApplicationField::Id, id),
                Filter::eq(ApplicationField::TutorEmail, tutor_email),
                Filter::eq(ApplicationField::Status, ApplicationStatus::Pending),
            ])
            .await?;
        if !deleted {
            return Err(self.not_pending_error(id, Some(tutor_email)).await);
        }
        tracing::info!(application_id = %id, tutor = %tutor_email, "application withdrawn");
        Ok(())
    }

    /// Rejects a Pending application.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown id and
    /// [`AppError::Conflict`] if it is no longer Pending.
    pub async fn reject(&self, id: ApplicationId) -> Result<TutorApplication, AppError> {
        let outcome = self
            .store
            .applications
            .update_one(
                &[
                    Filter::eq(ApplicationField::Id, id),
                    Filter::eq(ApplicationField::Status, ApplicationStatus::Pending),
                ],
                &Update::new().set(ApplicationField::Status, ApplicationStatus::Rejected),
            )
            .await?;
        if outcome.matched == 0 {
            return Err(self.not_pending_error(id, None).await);
        }
        tracing::info!(application_id = %id, "application rejected");
        self.get(id).await
    }
}
