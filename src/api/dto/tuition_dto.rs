//! Tuition request DTOs.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::TuitionStatus;
use crate::service::tuitions::{NewTuition, TuitionChanges, TuitionFilter, TuitionSort};

/// Query parameters for `GET /tuitions`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TuitionBoardParams {
    /// Free-text search over subject, class, location and description.
    pub search: Option<String>,
    /// Subject substring.
    pub subject: Option<String>,
    /// Location substring.
    pub location: Option<String>,
    /// Inclusive minimum budget.
    pub min_budget: Option<i64>,
    /// Inclusive maximum budget.
    pub max_budget: Option<i64>,
    /// `newest` (default), `oldest`, `budget_asc` or `budget_desc`.
    pub sort: Option<TuitionSort>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page (max 100).
    pub limit: Option<u32>,
}

impl TuitionBoardParams {
    /// The service-level filter.
    #[must_use]
    pub fn filter(&self) -> TuitionFilter {
        TuitionFilter {
            search: self.search.clone(),
            subject: self.subject.clone(),
            location: self.location.clone(),
            min_budget: self.min_budget,
            max_budget: self.max_budget,
            sort: self.sort.unwrap_or_default(),
        }
    }
}

/// Query parameters for status-filtered tuition listings.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TuitionListParams {
    /// Only tuitions with this status.
    pub status: Option<TuitionStatus>,
    /// Free-text search (admin listing only).
    pub search: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page (max 100).
    pub limit: Option<u32>,
}

/// Request body for `POST /student/tuitions`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTuitionRequest {
    /// Subject.
    pub subject: String,
    /// Class / grade level.
    pub class_level: String,
    /// Location.
    pub location: String,
    /// Budget in whole currency units.
    pub budget: i64,
    /// Preferred schedule.
    #[serde(default)]
    pub schedule: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

impl From<CreateTuitionRequest> for NewTuition {
    fn from(req: CreateTuitionRequest) -> Self {
        Self {
            subject: req.subject,
            class_level: req.class_level,
            location: req.location,
            budget: req.budget,
            schedule: req.schedule,
            description: req.description,
        }
    }
}

/// Request body for `PATCH /student/tuitions/{id}`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTuitionRequest {
    /// New subject.
    #[serde(default)]
    pub subject: Option<String>,
    /// New class level.
    #[serde(default)]
    pub class_level: Option<String>,
    /// New location.
    #[serde(default)]
    pub location: Option<String>,
    /// New budget.
    #[serde(default)]
    pub budget: Option<i64>,
    /// New schedule.
    #[serde(default)]
    pub schedule: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
}

impl From<UpdateTuitionRequest> for TuitionChanges {
    fn from(req: UpdateTuitionRequest) -> Self {
        Self {
            subject: req.subject,
            class_level: req.class_level,
            location: req.location,
            budget: req.budget,
            schedule: req.schedule,
            description: req.description,
        }
    }
}

/// Request body for `PATCH /admin/tuitions/{id}/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTuitionStatusRequest {
    /// Target status.
    pub status: TuitionStatus,
}
