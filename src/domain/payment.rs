//! Immutable payment records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::document::{self, Document};
use super::query::FieldValue;
use super::{ApplicationId, PaymentId, TuitionId};
use crate::error::AppError;

/// Provider-reported status of a completed charge.
pub const PAYMENT_STATUS_PAID: &str = "paid";

/// A completed charge, written exactly once per provider transaction.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PaymentRecord {
    /// Unique identifier.
    pub id: PaymentId,
    /// Provider transaction id (payment intent). Unique de-duplication key.
    pub transaction_id: String,
    /// Charged amount in the smallest currency unit.
    pub amount: i64,
    /// ISO currency code, lowercase.
    pub currency: String,
    /// Paying student's email.
    pub payer_email: String,
    /// Receiving tutor's email.
    pub payee_email: String,
    /// Application that was paid for.
    pub application_id: ApplicationId,
    /// Tuition the application belongs to.
    pub tuition_id: TuitionId,
    /// Provider payment status at confirmation time.
    pub payment_status: String,
    /// Confirmation timestamp.
    pub paid_at: DateTime<Utc>,
}

/// Addressable fields of [`PaymentRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentField {
    /// `id`
    Id,
    /// `transaction_id`
    TransactionId,
    /// `amount`
    Amount,
    /// `currency`
    Currency,
    /// `payer_email`
    PayerEmail,
    /// `payee_email`
    PayeeEmail,
    /// `application_id`
    ApplicationId,
    /// `tuition_id`
    TuitionId,
    /// `payment_status`
    PaymentStatus,
    /// `paid_at`
    PaidAt,
}

impl Document for PaymentRecord {
    type Field = PaymentField;

    const COLLECTION: &'static str = "payments";

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn unique_keys(&self) -> Vec<String> {
        vec![format!("transaction_id:{}", self.transaction_id)]
    }

    fn field(&self, field: PaymentField) -> FieldValue {
        match field {
            PaymentField::Id => self.id.into(),
            PaymentField::TransactionId => self.transaction_id.as_str().into(),
            PaymentField::Amount => self.amount.into(),
            PaymentField::Currency => self.currency.as_str().into(),
            PaymentField::PayerEmail => self.payer_email.as_str().into(),
            PaymentField::PayeeEmail => self.payee_email.as_str().into(),
            PaymentField::ApplicationId => self.application_id.into(),
            PaymentField::TuitionId => self.tuition_id.into(),
            PaymentField::PaymentStatus => self.payment_status.as_str().into(),
            PaymentField::PaidAt => self.paid_at.into(),
        }
    }

    fn set(&mut self, field: PaymentField, _value: FieldValue) -> Result<(), AppError> {
        document::immutable(Self::COLLECTION, field)
    }
}
