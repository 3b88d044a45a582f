//! Reqwest-backed Stripe Checkout adapter.
//!
//! Owns transport details only: form encoding of the session request,
//! bearer authentication, timeout and HTTP error mapping, and JSON
//! decoding into [`ProviderSession`].

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use super::{CheckoutRequest, CheckoutSession, PaymentProvider, ProviderSession};
use crate::error::AppError;

const SESSIONS_PATH: &str = "v1/checkout/sessions";

/// Stripe Checkout client.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    base: Url,
    secret_key: String,
}

impl fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeClient")
            .field("base", &self.base.as_str())
            .field("secret_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    /// Builds a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, secret_key: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            secret_key,
        })
    }

    fn sessions_url(&self) -> String {
        format!("{}/{SESSIONS_PATH}", self.base.as_str().trim_end_matches('/'))
    }

    async fn decode<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
        session_id: Option<&str>,
    ) -> Result<T, AppError> {
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref(), session_id));
        }
        serde_json::from_slice(body.as_ref()).map_err(|e| {
            AppError::PaymentProvider(format!("invalid checkout session payload: {e}"))
        })
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, AppError> {
        let response = self
            .client
            .post(self.sessions_url())
            .bearer_auth(&self.secret_key)
            .form(&checkout_form(request))
            .send()
            .await?;
        let created: SessionDto = Self::decode(response, None).await?;
        Ok(CheckoutSession {
            id: created.id,
            url: created.url,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<ProviderSession, AppError> {
        if !is_valid_session_id(session_id) {
            return Err(AppError::InvalidRequest(
                "session_id contains unsupported characters".to_string(),
            ));
        }
        let response = self
            .client
            .get(format!("{}/{session_id}", self.sessions_url()))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        let session: SessionDto = Self::decode(response, Some(session_id)).await?;
        Ok(session.into())
    }
}

fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Flattens a checkout request into Stripe's bracketed form encoding.
fn checkout_form(request: &CheckoutRequest) -> Vec<(String, String)> {
    let item = &request.line_item;
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("customer_email".to_string(), request.customer_email.clone()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        (
            "line_items[0][price_data][currency]".to_string(),
            item.currency.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            item.unit_amount.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            item.name.clone(),
        ),
        ("line_items[0][quantity]".to_string(), item.quantity.to_string()),
    ];
    let mut metadata: Vec<_> = request.metadata.iter().collect();
    metadata.sort();
    form.extend(
        metadata
            .into_iter()
            .map(|(k, v)| (format!("metadata[{k}]"), v.clone())),
    );
    form
}

fn map_status_error(status: StatusCode, body: &[u8], session_id: Option<&str>) -> AppError {
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = session_id {
            return AppError::not_found("checkout session", id);
        }
    }
    let message = serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| "no error message".to_string());
    AppError::PaymentProvider(format!("provider returned {status}: {message}"))
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDto,
}

#[derive(Debug, Deserialize)]
struct ErrorDto {
    message: Option<String>,
}

/// `payment_intent` is an id unless the caller asked for expansion.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpandableId {
    Id(String),
    Object { id: String },
}

impl ExpandableId {
    fn into_id(self) -> String {
        match self {
            Self::Id(id) | Self::Object { id } => id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionDto {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    payment_intent: Option<ExpandableId>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default)]
    customer_details: Option<CustomerDetailsDto>,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct CustomerDetailsDto {
    #[serde(default)]
    email: Option<String>,
}

impl From<SessionDto> for ProviderSession {
    fn from(dto: SessionDto) -> Self {
        Self {
            id: dto.id,
            payment_intent: dto.payment_intent.map(ExpandableId::into_id),
            payment_status: dto.payment_status.unwrap_or_default(),
            amount_total: dto.amount_total,
            currency: dto.currency,
            customer_email: dto
                .customer_email
                .or_else(|| dto.customer_details.and_then(|d| d.email)),
            metadata: dto.metadata.unwrap_or_default(),
        }
    }
}
