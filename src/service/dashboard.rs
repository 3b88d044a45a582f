//! Per-role dashboard totals, computed with store aggregations.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    AggregateRow, ApplicationField, ApplicationStatus, Filter, PaymentField, Role, TuitionField,
    TuitionStatus, UserField,
};
use crate::error::AppError;
use crate::persistence::Store;

/// Amount collected in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CurrencyTotal {
    /// Currency code.
    pub currency: String,
    /// Sum in the smallest currency unit.
    pub amount: i64,
    /// Number of payments.
    pub count: u64,
}

/// Totals shown to a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StudentDashboard {
    /// Own tuitions by status.
    pub tuitions: BTreeMap<String, u64>,
    /// Applications received on own tuitions, by status.
    pub applications: BTreeMap<String, u64>,
    /// Amount paid, by currency.
    pub spent: Vec<CurrencyTotal>,
}

/// Totals shown to a tutor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TutorDashboard {
    /// Own applications by status.
    pub applications: BTreeMap<String, u64>,
    /// Amount received, by currency.
    pub earnings: Vec<CurrencyTotal>,
}

/// Platform-wide totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AdminDashboard {
    /// Registered users by role.
    pub users_by_role: BTreeMap<String, u64>,
    /// Tuitions by status.
    pub tuitions_by_status: BTreeMap<String, u64>,
    /// Applications by status.
    pub applications_by_status: BTreeMap<String, u64>,
    /// Revenue by currency.
    pub revenue: Vec<CurrencyTotal>,
}

/// Group counts keyed by label, with every known label present.
fn counts(labels: &[&str], rows: Vec<AggregateRow>) -> BTreeMap<String, u64> {
    let mut map: BTreeMap<String, u64> = labels.iter().map(|l| ((*l).to_string(), 0)).collect();
    for row in rows {
        if let Some(key) = row.key {
            *map.entry(key).or_default() += row.count;
        }
    }
    map
}

fn currency_totals(rows: Vec<AggregateRow>) -> Vec<CurrencyTotal> {
    rows.into_iter()
        .filter_map(|row| {
            row.key.map(|currency| CurrencyTotal {
                currency,
                amount: row.total,
                count: row.count,
            })
        })
        .collect()
}

const TUITION_STATUSES: [&str; 2] = [
    TuitionStatus::Pending.as_str(),
    TuitionStatus::Approved.as_str(),
];

const APPLICATION_STATUSES: [&str; 3] = [
    ApplicationStatus::Pending.as_str(),
    ApplicationStatus::Approved.as_str(),
    ApplicationStatus::Rejected.as_str(),
];

/// Dashboard aggregations.
#[derive(Debug, Clone)]
pub struct DashboardService {
    store: Store,
}

impl DashboardService {
    /// Creates a new `DashboardService`.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Student totals. Application counts only cover the student's own
    /// tuitions.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on store failure.
    pub async fn student(&self, email: &str) -> Result<StudentDashboard, AppError> {
        let tuitions = self
            .store
            .tuitions
            .aggregate(
                &[Filter::eq(TuitionField::StudentEmail, email)],
                Some(TuitionField::Status),
                None,
            )
            .await?;
        let applications = self
            .store
            .applications
            .aggregate(
                &[Filter::eq(ApplicationField::StudentEmail, email)],
                Some(ApplicationField::Status),
                None,
            )
            .await?;
        let spent = self
            .store
            .payments
            .aggregate(
                &[Filter::eq(PaymentField::PayerEmail, email)],
                Some(PaymentField::Currency),
                Some(PaymentField::Amount),
            )
            .await?;
        Ok(StudentDashboard {
            tuitions: counts(&TUITION_STATUSES, tuitions),
            applications: counts(&APPLICATION_STATUSES, applications),
            spent: currency_totals(spent),
        })
    }

    /// Tutor totals.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on store failure.
    pub async fn tutor(&self, email: &str) -> Result<TutorDashboard, AppError> {
        let applications = self
            .store
            .applications
            .aggregate(
                &[Filter::eq(ApplicationField::TutorEmail, email)],
                Some(ApplicationField::Status),
                None,
            )
            .await?;
        let earnings = self
            .store
            .payments
            .aggregate(
                &[Filter::eq(PaymentField::PayeeEmail, email)],
                Some(PaymentField::Currency),
                Some(PaymentField::Amount),
            )
            .await?;
        Ok(TutorDashboard {
            applications: counts(&APPLICATION_STATUSES, applications),
            earnings: currency_totals(earnings),
        })
    }

    /// Platform totals.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on store failure.
    pub async fn admin(&self) -> Result<AdminDashboard, AppError> {
        let roles: Vec<&str> = Role::ALL.iter().map(Role::as_str).collect();
        let users = self
            .store
            .users
            .aggregate(&[], Some(UserField::Role), None)
            .await?;
        let tuitions = self
            .store
            .tuitions
            .aggregate(&[], Some(TuitionField::Status), None)
            .await?;
        let applications = self
            .store
            .applications
            .aggregate(&[], Some(ApplicationField::Status), None)
            .await?;
        let revenue = self
            .store
            .payments
            .aggregate(&[], Some(PaymentField::Currency), Some(PaymentField::Amount))
            .await?;
        Ok(AdminDashboard {
            users_by_role: counts(&roles, users),
            tuitions_by_status: counts(&TUITION_STATUSES, tuitions),
            applications_by_status: counts(&APPLICATION_STATUSES, applications),
            revenue: currency_totals(revenue),
        })
    }
}
