//! Tutor application DTOs.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ApplicationStatus, TuitionId};
use crate::service::applications::{ApplicationFilter, NewApplication};

/// Request body for `POST /tutor/applications`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateApplicationRequest {
    /// Approved tuition to apply to.
    pub tuition_id: TuitionId,
    /// Degrees, certificates.
    pub qualifications: String,
    /// Teaching experience.
    pub experience: String,
    /// Expected monthly salary in whole currency units.
    pub expected_salary: i64,
}

impl From<CreateApplicationRequest> for NewApplication {
    fn from(req: CreateApplicationRequest) -> Self {
        Self {
            tuition_id: req.tuition_id,
            qualifications: req.qualifications,
            experience: req.experience,
            expected_salary: req.expected_salary,
        }
    }
}

/// Query parameters for application listings.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApplicationListParams {
    /// Only applications with this status.
    pub status: Option<ApplicationStatus>,
    /// Only applications to this tuition.
    pub tuition_id: Option<TuitionId>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page (max 100).
    pub limit: Option<u32>,
}

impl ApplicationListParams {
    /// The service-level filter.
    #[must_use]
    pub fn filter(&self) -> ApplicationFilter {
        ApplicationFilter {
            status: self.status,
            tuition_id: self.tuition_id,
        }
    }
}
