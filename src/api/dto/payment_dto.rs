//! Checkout and confirmation DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ApplicationId, PaymentRecord};
use crate::service::ConfirmOutcome;

/// Request body for `POST /payments/checkout-session`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutSessionRequest {
    /// Pending application to pay for.
    pub application_id: ApplicationId,
}

/// Response body for `POST /payments/checkout-session`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutSessionResponse {
    /// Provider session id.
    pub session_id: String,
    /// Hosted checkout page.
    pub url: Option<String>,
}

/// Request body for `POST /payments/confirm`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    /// Checkout session id from the success redirect.
    pub session_id: String,
}

/// Confirmation result discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmStatus {
    /// The payment was recorded by this call.
    Confirmed,
    /// The transaction had already been recorded.
    Duplicate,
    /// The provider does not report the session as paid.
    NotPaid,
}

/// Response body for `POST /payments/confirm`. Always 200.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmPaymentResponse {
    /// `true` only for `confirmed`.
    pub success: bool,
    /// Outcome.
    pub status: ConfirmStatus,
    /// Explanation for non-success outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Provider transaction id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Whether the application status changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_modified: Option<bool>,
    /// The stored payment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentRecord>,
}

impl From<ConfirmOutcome> for ConfirmPaymentResponse {
    fn from(outcome: ConfirmOutcome) -> Self {
        match outcome {
            ConfirmOutcome::Confirmed {
                application_modified,
                payment,
            } => Self {
                success: true,
                status: ConfirmStatus::Confirmed,
                message: None,
                transaction_id: Some(payment.transaction_id.clone()),
                application_modified: Some(application_modified),
                payment: Some(payment),
            },
            ConfirmOutcome::Duplicate { transaction_id } => Self {
                success: false,
                status: ConfirmStatus::Duplicate,
                message: Some("payment already exists".to_string()),
                transaction_id: Some(transaction_id),
                application_modified: None,
                payment: None,
            },
            ConfirmOutcome::NotPaid => Self {
                success: false,
                status: ConfirmStatus::NotPaid,
                message: Some("payment not completed".to_string()),
                transaction_id: None,
                application_modified: None,
                payment: None,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn not_paid_body_shape() {
        let Ok(body) = serde_json::to_value(ConfirmPaymentResponse::from(ConfirmOutcome::NotPaid))
        else {
            panic!("response should serialize");
        };
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "status": "not_paid",
                "message": "payment not completed"
            })
        );
    }

    #[test]
    fn duplicate_body_carries_transaction() {
        let outcome = ConfirmOutcome::Duplicate {
            transaction_id: "pi_9".to_string(),
        };
        let Ok(body) = serde_json::to_value(ConfirmPaymentResponse::from(outcome)) else {
            panic!("response should serialize");
        };
        assert_eq!(body["status"], "duplicate");
        assert_eq!(body["transaction_id"], "pi_9");
        assert_eq!(body["message"], "payment already exists");
    }
}
