//! Payment provider port.
//!
//! The service only needs two provider calls: create a hosted checkout
//! session and retrieve it later to learn whether it was paid. Confirmation
//! is pull based; there is no webhook receiver.

pub mod stripe;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::error::AppError;

pub use stripe::StripeClient;

/// Provider value of `payment_status` for a settled session.
pub const SESSION_STATUS_PAID: &str = "paid";

/// Metadata keys attached to every checkout session.
pub mod metadata_keys {
    /// Application being paid for.
    pub const APPLICATION_ID: &str = "application_id";
    /// Tuition the application belongs to.
    pub const TUITION_ID: &str = "tuition_id";
    /// Paying student.
    pub const STUDENT_EMAIL: &str = "student_email";
    /// Receiving tutor.
    pub const TUTOR_EMAIL: &str = "tutor_email";
}

/// One priced line on a checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// Product name shown to the payer.
    pub name: String,
    /// Unit price in the smallest currency unit.
    pub unit_amount: i64,
    /// Lowercase ISO currency code.
    pub currency: String,
    /// Quantity.
    pub quantity: u32,
}

/// Parameters for a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// The single line item being paid.
    pub line_item: LineItem,
    /// Prefilled payer email.
    pub customer_email: String,
    /// Redirect target after payment.
    pub success_url: String,
    /// Redirect target when the payer cancels.
    pub cancel_url: String,
    /// Key/value pairs echoed back by [`PaymentProvider::retrieve_session`].
    pub metadata: HashMap<String, String>,
}

/// A newly created checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Provider session id.
    pub id: String,
    /// Hosted page URL, if the provider returned one.
    pub url: Option<String>,
}

/// A checkout session as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderSession {
    /// Provider session id.
    pub id: String,
    /// Payment-intent id; the transaction id of a paid session.
    pub payment_intent: Option<String>,
    /// Provider payment status (`"paid"`, `"unpaid"`, ...).
    pub payment_status: String,
    /// Total charged in the smallest currency unit.
    pub amount_total: Option<i64>,
    /// Currency of `amount_total`.
    pub currency: Option<String>,
    /// Payer email as collected by the provider.
    pub customer_email: Option<String>,
    /// Metadata attached at creation.
    pub metadata: HashMap<String, String>,
}

impl ProviderSession {
    /// Whether the provider reports the session as paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == SESSION_STATUS_PAID
    }

    /// Metadata value by key, ignoring blank values.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Outbound port to a hosted checkout provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync + fmt::Debug {
    /// Creates a hosted checkout session.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::PaymentProvider`] on transport or provider
    /// failure.
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, AppError>;

    /// Retrieves a checkout session by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the provider does not know the
    /// session, or [`AppError::PaymentProvider`] on any other failure.
    async fn retrieve_session(&self, session_id: &str) -> Result<ProviderSession, AppError>;
}
