//! Tuition requests: student CRUD, public browsing and admin review.

use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{
    Direction, FieldValue, Filter, ListQuery, Page, PageRequest, TuitionField, TuitionId,
    TuitionRequest, TuitionStatus, Update,
};
use crate::error::AppError;
use crate::persistence::{InsertOutcome, Store};

/// Text fields covered by free-text search.
const SEARCH_FIELDS: [TuitionField; 4] = [
    TuitionField::Subject,
    TuitionField::ClassLevel,
    TuitionField::Location,
    TuitionField::Description,
];

/// Sort order for tuition listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TuitionSort {
    /// Most recent first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Cheapest first.
    BudgetAsc,
    /// Most expensive first.
    BudgetDesc,
}

impl TuitionSort {
    const fn field_and_direction(self) -> (TuitionField, Direction) {
        match self {
            Self::Newest => (TuitionField::CreatedAt, Direction::Desc),
            Self::Oldest => (TuitionField::CreatedAt, Direction::Asc),
            Self::BudgetAsc => (TuitionField::Budget, Direction::Asc),
            Self::BudgetDesc => (TuitionField::Budget, Direction::Desc),
        }
    }
}

/// Filters for the public tuition board.
#[derive(Debug, Clone, Default)]
pub struct TuitionFilter {
    /// Free-text search over subject, class, location and description.
    pub search: Option<String>,
    /// Subject substring.
    pub subject: Option<String>,
    /// Location substring.
    pub location: Option<String>,
    /// Inclusive lower budget bound.
    pub min_budget: Option<i64>,
    /// Inclusive upper budget bound.
    pub max_budget: Option<i64>,
    /// Sort order.
    pub sort: TuitionSort,
}

/// Input for a new tuition request.
#[derive(Debug, Clone)]
pub struct NewTuition {
    /// Subject.
    pub subject: String,
    /// Class / grade level.
    pub class_level: String,
    /// Location.
    pub location: String,
    /// Budget in whole currency units; must be positive.
    pub budget: i64,
    /// Preferred schedule.
    pub schedule: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
}

/// Partial edit of a Pending tuition.
#[derive(Debug, Clone, Default)]
pub struct TuitionChanges {
    /// New subject.
    pub subject: Option<String>,
    /// New class level.
    pub class_level: Option<String>,
    /// New location.
    pub location: Option<String>,
    /// New budget.
    pub budget: Option<i64>,
    /// New schedule.
    pub schedule: Option<String>,
    /// New description.
    pub description: Option<String>,
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn positive_budget(budget: i64) -> Result<i64, AppError> {
    if budget <= 0 {
        return Err(AppError::InvalidRequest(
            "budget must be greater than zero".to_string(),
        ));
    }
    Ok(budget)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Tuition request workflows.
#[derive(Debug, Clone)]
pub struct TuitionService {
    store: Store,
}

impl TuitionService {
    /// Creates a new `TuitionService`.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Posts a new request as Pending.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] on blank fields or a
    /// non-positive budget.
    pub async fn create(
        &self,
        student_email: &str,
        input: NewTuition,
    ) -> Result<TuitionRequest, AppError> {
        let tuition = TuitionRequest {
            id: TuitionId::new(),
            student_email: student_email.to_string(),
            subject: required("subject", &input.subject)?,
            class_level: required("class_level", &input.class_level)?,
            location: required("location", &input.location)?,
            budget: positive_budget(input.budget)?,
            schedule: non_blank(input.schedule),
            description: non_blank(input.description),
            status: TuitionStatus::Pending,
            created_at: Utc::now(),
        };
        match self.store.tuitions.insert_one(tuition.clone()).await? {
            InsertOutcome::Inserted => {
                tracing::info!(tuition_id = %tuition.id, student = %student_email, "tuition created");
                Ok(tuition)
            }
            InsertOutcome::Duplicate => Err(AppError::Internal(format!(
                "tuition id collision: {}",
                tuition.id
            ))),
        }
    }

    /// Approved tuitions for the public board.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] if `min_budget > max_budget`.
    pub async fn list_public(
        &self,
        filter: &TuitionFilter,
        page: PageRequest,
    ) -> Result<Page<TuitionRequest>, AppError> {
        if let (Some(min), Some(max)) = (filter.min_budget, filter.max_budget) {
            if min > max {
                return Err(AppError::InvalidRequest(
                    "min_budget must not exceed max_budget".to_string(),
                ));
            }
        }
        let (sort_field, direction) = filter.sort.field_and_direction();
        let query = ListQuery::new()
            .eq(TuitionField::Status, TuitionStatus::Approved)
            .contains_opt(TuitionField::Subject, filter.subject.as_deref())
            .contains_opt(TuitionField::Location, filter.location.as_deref())
            .range_opt(
                TuitionField::Budget,
                filter.min_budget.map(FieldValue::Int),
                filter.max_budget.map(FieldValue::Int),
            )
            .search(SEARCH_FIELDS.to_vec(), filter.search.as_deref())
            .sort_by(sort_field, direction)
            .page(page);
        self.store.tuitions.find(&query).await
    }

    /// One Approved tuition. Pending ones are hidden from the public.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if missing or not Approved.
    pub async fn get_public(&self, id: TuitionId) -> Result<TuitionRequest, AppError> {
        self.store
            .tuitions
            .find_one(&[
                Filter::eq(TuitionField::Id, id),
                Filter::eq(TuitionField::Status, TuitionStatus::Approved),
            ])
            .await?
            .ok_or_else(|| AppError::not_found("tuition", id))
    }

    /// Any tuition by id, regardless of status.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if missing.
    pub async fn get(&self, id: TuitionId) -> Result<TuitionRequest, AppError> {
        self.store
            .tuitions
            .find_one(&[Filter::eq(TuitionField::Id, id)])
            .await?
            .ok_or_else(|| AppError::not_found("tuition", id))
    }

    /// The student's own tuitions, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on store failure.
    pub async fn list_for_student(
        &self,
        student_email: &str,
        status: Option<TuitionStatus>,
        page: PageRequest,
    ) -> Result<Page<TuitionRequest>, AppError> {
        let query = ListQuery::new()
            .eq(TuitionField::StudentEmail, student_email)
            .eq_opt(TuitionField::Status, status)
            .sort_by(TuitionField::CreatedAt, Direction::Desc)
            .page(page);
        self.store.tuitions.find(&query).await
    }

    /// Every tuition, for admin review.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on store failure.
    pub async fn list_all(
        &self,
        status: Option<TuitionStatus>,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<TuitionRequest>, AppError> {
        let mut fields = SEARCH_FIELDS.to_vec();
        fields.push(TuitionField::StudentEmail);
        let query = ListQuery::new()
            .eq_opt(TuitionField::Status, status)
            .search(fields, search)
            .sort_by(TuitionField::CreatedAt, Direction::Desc)
            .page(page);
        self.store.tuitions.find(&query).await
    }

    /// Explains why an owned-and-pending match failed.
    async fn ownership_error(&self, student_email: &str, id: TuitionId) -> AppError {
        match self.get(id).await {
            Ok(t) if t.student_email == student_email => {
                AppError::Conflict(format!("tuition {id} is {} and can no longer change", t.status))
            }
            Ok(_) | Err(AppError::NotFound { .. }) => AppError::not_found("tuition", id),
            Err(other) => other,
        }
    }

    fn owned_pending(student_email: &str, id: TuitionId) -> [Filter<TuitionField>; 3] {
        [
            Filter::eq(TuitionField::Id, id),
            Filter::eq(TuitionField::StudentEmail, student_email),
            Filter::eq(TuitionField::Status, TuitionStatus::Pending),
        ]
    }

    /// Edits the student's own tuition while it is Pending.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the tuition is not the student's,
    /// [`AppError::Conflict`] once it has been approved, and
    /// [`AppError::InvalidRequest`] on invalid or empty changes.
    pub async fn update_own(
        &self,
        student_email: &str,
        id: TuitionId,
        changes: TuitionChanges,
    ) -> Result<TuitionRequest, AppError> {
        let update = Update::new()
            .set_opt(
                TuitionField::Subject,
                changes.subject.as_deref().map(|v| required("subject", v)).transpose()?,
            )
            .set_opt(
                TuitionField::ClassLevel,
                changes
                    .class_level
                    .as_deref()
                    .map(|v| required("class_level", v))
                    .transpose()?,
            )
            .set_opt(
                TuitionField::Location,
                changes.location.as_deref().map(|v| required("location", v)).transpose()?,
            )
            .set_opt(
                TuitionField::Budget,
                changes.budget.map(positive_budget).transpose()?,
            )
            .set_opt(TuitionField::Schedule, changes.schedule)
            .set_opt(TuitionField::Description, changes.description);
        if update.is_empty() {
            return Err(AppError::InvalidRequest("no changes supplied".to_string()));
        }

        let outcome = self
            .store
            .tuitions
            .update_one(&Self::owned_pending(student_email, id), &update)
            .await?;
        if outcome.matched == 0 {
            return Err(self.ownership_error(student_email, id).await);
        }
        tracing::info!(tuition_id = %id, modified = outcome.modified, "tuition edited");
        self.get(id).await
    }

    /// Deletes the student's own tuition while it is Pending.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the tuition is not the student's
    /// and [`AppError::Conflict`] once it has been approved.
    pub async fn delete_own(&self, student_email: &str, id: TuitionId) -> Result<(), AppError> {
        let deleted = self
            .store
            .tuitions
            .delete_one(&Self::owned_pending(student_email, id))
            .await?;
        if !deleted {
            return Err(self.ownership_error(student_email, id).await);
        }
        tracing::info!(tuition_id = %id, "tuition deleted");
        Ok(())
    }

    /// Moves a Pending tuition to `status`. Review is one-way: an
    /// Approved tuition never returns to Pending.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] when `status` is Pending,
    /// [`AppError::NotFound`] for an unknown id and [`AppError::Conflict`]
    /// if the tuition was already reviewed.
    pub async fn set_status(
        &self,
        id: TuitionId,
        status: TuitionStatus,
    ) -> Result<TuitionRequest, AppError> {
        if status == TuitionStatus::Pending {
            return Err(AppError::InvalidRequest(
                "a tuition cannot be moved back to Pending".to_string(),
            ));
        }
        let outcome = self
            .store
            .tuitions
            .update_one(
                &[
                    Filter::eq(TuitionField::Id, id),
                    Filter::eq(TuitionField::Status, TuitionStatus::Pending),
                ],
                &Update::new().set(TuitionField::Status, status),
            )
            .await?;
        if outcome.matched == 0 {
            let current = self.get(id).await?;
            return Err(AppError::Conflict(format!(
                "tuition {id} is already {}",
                current.status
            )));
        }
        tracing::info!(tuition_id = %id, %status, "tuition status changed");
        self.get(id).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn new_tuition(subject: &str, budget: i64) -> NewTuition {
        NewTuition {
            subject: subject.to_string(),
            class_level: "Class 9".to_string(),
            location: "Dhanmondi, Dhaka".to_string(),
            budget,
            schedule: Some("3 days/week".to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn created_pending_then_approved_is_public() {
        let svc = TuitionService::new(Store::in_memory());
        let Ok(tuition) = svc.create("s@example.com", new_tuition("Physics", 5000)).await else {
            panic!("create should succeed");
        };
        assert_eq!(tuition.status, TuitionStatus::Pending);
        assert!(matches!(
            svc.get_public(tuition.id).await,
            Err(AppError::NotFound { .. })
        ));

        let Ok(approved) = svc.set_status(tuition.id, TuitionStatus::Approved).await else {
            panic!("approve should succeed");
        };
        assert_eq!(approved.status, TuitionStatus::Approved);

        let Ok(board) = svc
            .list_public(&TuitionFilter::default(), PageRequest::default())
            .await
        else {
            panic!("listing should succeed");
        };
        assert_eq!(board.pagination.total, 1);
        assert_eq!(board.data.first().map(|t| t.id), Some(tuition.id));
    }

    #[tokio::test]
    async fn rejects_invalid_input() {
        let svc = TuitionService::new(Store::in_memory());
        assert!(matches!(
            svc.create("s@example.com", new_tuition("Physics", 0)).await,
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            svc.create("s@example.com", new_tuition("   ", 100)).await,
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn public_board_filters_and_sorts() {
        let svc = TuitionService::new(Store::in_memory());
        for (subject, budget) in [("Physics", 3000), ("Math", 8000), ("Higher Math", 5000)] {
            let Ok(t) = svc.create("s@example.com", new_tuition(subject, budget)).await else {
                panic!("create should succeed");
            };
            assert!(svc.set_status(t.id, TuitionStatus::Approved).await.is_ok());
        }

        let filter = TuitionFilter {
            search: Some("math".to_string()),
            min_budget: Some(4000),
            sort: TuitionSort::BudgetAsc,
            ..TuitionFilter::default()
        };
        let Ok(page) = svc.list_public(&filter, PageRequest::default()).await else {
            panic!("listing should succeed");
        };
        let budgets: Vec<i64> = page.data.iter().map(|t| t.budget).collect();
        assert_eq!(budgets, vec![5000, 8000]);

        let inverted = TuitionFilter {
            min_budget: Some(9),
            max_budget: Some(1),
            ..TuitionFilter::default()
        };
        assert!(svc.list_public(&inverted, PageRequest::default()).await.is_err());
    }

    #[tokio::test]
    async fn owner_edits_only_while_pending() {
        let svc = TuitionService::new(Store::in_memory());
        let Ok(t) = svc.create("s@example.com", new_tuition("Physics", 5000)).await else {
            panic!("create should succeed");
        };
        let changes = TuitionChanges {
            budget: Some(6000),
            ..TuitionChanges::default()
        };

        assert!(matches!(
            svc.update_own("other@example.com", t.id, changes.clone()).await,
            Err(AppError::NotFound { .. })
        ));
        let Ok(edited) = svc.update_own("s@example.com", t.id, changes.clone()).await else {
            panic!("owner edit should succeed");
        };
        assert_eq!(edited.budget, 6000);

        assert!(svc.set_status(t.id, TuitionStatus::Approved).await.is_ok());
        assert!(matches!(
            svc.update_own("s@example.com", t.id, changes).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            svc.delete_own("s@example.com", t.id).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn approved_tuition_cannot_be_reverted() {
        let svc = TuitionService::new(Store::in_memory());
        let Ok(t) = svc.create("s@example.com", new_tuition("Biology", 4000)).await else {
            panic!("create should succeed");
        };
        assert!(matches!(
            svc.set_status(t.id, TuitionStatus::Pending).await,
            Err(AppError::InvalidRequest(_))
        ));
        assert!(svc.set_status(t.id, TuitionStatus::Approved).await.is_ok());

        assert!(matches!(
            svc.set_status(t.id, TuitionStatus::Pending).await,
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            svc.set_status(t.id, TuitionStatus::Approved).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            svc.set_status(TuitionId::new(), TuitionStatus::Approved).await,
            Err(AppError::NotFound { .. })
        ));

        assert!(matches!(
            svc.delete_own("s@example.com", t.id).await,
            Err(AppError::Conflict(_))
        ));
        let Ok(current) = svc.get(t.id).await else {
            panic!("tuition should still exist");
        };
        assert_eq!(current.status, TuitionStatus::Approved);
    }

    #[tokio::test]
    async fn owner_deletes_pending() {
        let svc = TuitionService::new(Store::in_memory());
        let Ok(t) = svc.create("s@example.com", new_tuition("Chemistry", 2000)).await else {
            panic!("create should succeed");
        };
        assert!(svc.delete_own("s@example.com", t.id).await.is_ok());
        assert!(matches!(svc.get(t.id).await, Err(AppError::NotFound { .. })));
    }
}
