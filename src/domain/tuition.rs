//! Student-posted tuition requests.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::TuitionId;
use super::document::{self, Document};
use super::query::FieldValue;
use crate::error::AppError;

/// Review status of a tuition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TuitionStatus {
    /// Awaiting admin review. The owning student may still edit or delete it.
    Pending,
    /// Published in the public listing and open for applications.
    Approved,
}

impl TuitionStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 2] = [Self::Pending, Self::Approved];

    /// Stored / wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
        }
    }
}

impl fmt::Display for TuitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TuitionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::InvalidRequest(format!("unknown tuition status: {s}")))
    }
}

impl From<TuitionStatus> for FieldValue {
    fn from(status: TuitionStatus) -> Self {
        Self::Text(status.as_str().to_string())
    }
}

/// A listing posted by a student looking for a tutor.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TuitionRequest {
    /// Unique identifier.
    pub id: TuitionId,
    /// Owning student's email.
    pub student_email: String,
    /// Subject to be taught.
    pub subject: String,
    /// Class / grade level.
    pub class_level: String,
    /// Where the tuition takes place.
    pub location: String,
    /// Monthly budget in whole currency units.
    pub budget: i64,
    /// Preferred days / times.
    pub schedule: Option<String>,
    /// Free-form details.
    pub description: Option<String>,
    /// Review status.
    pub status: TuitionStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Addressable fields of [`TuitionRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuitionField {
    /// `id`
    Id,
    /// `student_email`
    StudentEmail,
    /// `subject`
    Subject,
    /// `class_level`
    ClassLevel,
    /// `location`
    Location,
    /// `budget`
    Budget,
    /// `schedule`
    Schedule,
    /// `description`
    Description,
    /// `status`
    Status,
    /// `created_at`
    CreatedAt,
}

impl Document for TuitionRequest {
    type Field = TuitionField;

    const COLLECTION: &'static str = "tuitions";

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn field(&self, field: TuitionField) -> FieldValue {
        match field {
            TuitionField::Id => self.id.into(),
            TuitionField::StudentEmail => self.student_email.as_str().into(),
            TuitionField::Subject => self.subject.as_str().into(),
            TuitionField::ClassLevel => self.class_level.as_str().into(),
            TuitionField::Location => self.location.as_str().into(),
            TuitionField::Budget => self.budget.into(),
            TuitionField::Schedule => self.schedule.clone().into(),
            TuitionField::Description => self.description.clone().into(),
            TuitionField::Status => self.status.into(),
            TuitionField::CreatedAt => self.created_at.into(),
        }
    }

    fn set(&mut self, field: TuitionField, value: FieldValue) -> Result<(), AppError> {
        match field {
            TuitionField::Subject => self.subject = document::text("subject", value)?,
            TuitionField::ClassLevel => self.class_level = document::text("class_level", value)?,
            TuitionField::Location => self.location = document::text("location", value)?,
            TuitionField::Budget => self.budget = document::int("budget", value)?,
            TuitionField::Schedule => self.schedule = document::optional_text("schedule", value)?,
            TuitionField::Description => {
                self.description = document::optional_text("description", value)?;
            }
            TuitionField::Status => self.status = document::text("status", value)?.parse()?,
            TuitionField::Id | TuitionField::StudentEmail | TuitionField::CreatedAt => {
                return document::immutable(Self::COLLECTION, field);
            }
        }
        Ok(())
    }
}
