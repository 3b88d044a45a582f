//! Tutor applications against tuition requests.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::document::{self, Document};
use super::query::FieldValue;
use super::{ApplicationId, TuitionId};
use crate::error::AppError;

/// Lifecycle of a tutor application.
///
/// `Pending → Approved` happens only through a confirmed payment;
/// `Pending → Rejected` only through an admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ApplicationStatus {
    /// Submitted, awaiting payment or review.
    Pending,
    /// Paid for by the student.
    Approved,
    /// Declined by an admin.
    Rejected,
}

impl ApplicationStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Stored / wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::InvalidRequest(format!("unknown application status: {s}")))
    }
}

impl From<ApplicationStatus> for FieldValue {
    fn from(status: ApplicationStatus) -> Self {
        Self::Text(status.as_str().to_string())
    }
}

/// A tutor's bid on a tuition request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TutorApplication {
    /// Unique identifier.
    pub id: ApplicationId,
    /// Tuition applied to.
    pub tuition_id: TuitionId,
    /// Applying tutor's email.
    pub tutor_email: String,
    /// Applying tutor's display name.
    pub tutor_name: String,
    /// Email of the student who owns the tuition.
    pub student_email: String,
    /// Degrees, certificates.
    pub qualifications: String,
    /// Teaching experience summary.
    pub experience: String,
    /// Monthly salary the tutor asks for, in whole currency units.
    pub expected_salary: i64,
    /// Lifecycle status.
    pub status: ApplicationStatus,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

/// Addressable fields of [`TutorApplication`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationField {
    /// `id`
    Id,
    /// `tuition_id`
    TuitionId,
    /// `tutor_email`
    TutorEmail,
    /// `tutor_name`
    TutorName,
    /// `student_email`
    StudentEmail,
    /// `qualifications`
    Qualifications,
    /// `experience`
    Experience,
    /// `expected_salary`
    ExpectedSalary,
    /// `status`
    Status,
    /// `created_at`
    CreatedAt,
}

impl Document for TutorApplication {
    type Field = ApplicationField;

    const COLLECTION: &'static str = "applications";

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn unique_keys(&self) -> Vec<String> {
        vec![format!("tuition_tutor:{}:{}", self.tuition_id, self.tutor_email)]
    }

    fn field(&self, field: ApplicationField) -> FieldValue {
        match field {
            ApplicationField::Id => self.id.into(),
            ApplicationField::TuitionId => self.tuition_id.into(),
            ApplicationField::TutorEmail => self.tutor_email.as_str().into(),
            ApplicationField::TutorName => self.tutor_name.as_str().into(),
            ApplicationField::StudentEmail => self.student_email.as_str().into(),
            ApplicationField::Qualifications => self.qualifications.as_str().into(),
            ApplicationField::Experience => self.experience.as_str().into(),
            ApplicationField::ExpectedSalary => self.expected_salary.into(),
            ApplicationField::Status => self.status.into(),
            ApplicationField::CreatedAt => self.created_at.into(),
        }
    }

    fn set(&mut self, field: ApplicationField, value: FieldValue) -> Result<(), AppError> {
        match field {
            ApplicationField::Status => self.status = document::text("status", value)?.parse()?,
            ApplicationField::Qualifications => {
                self.qualifications = document::text("qualifications", value)?;
            }
            ApplicationField::Experience => {
                self.experience = document::text("experience", value)?;
            }
            ApplicationField::ExpectedSalary => {
                self.expected_salary = document::int("expected_salary", value)?;
            }
            other => return document::immutable(Self::COLLECTION, other),
        }
        Ok(())
    }
}
