//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use chrono::Duration;

use crate::payments::PaymentProvider;
use crate::persistence::Store;
use crate::service::{
    AccountService, ApplicationService, CheckoutSettings, DashboardService, PaymentService,
    TuitionService,
};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Users and bearer sessions.
    pub accounts: Arc<AccountService>,
    /// Tuition requests.
    pub tuitions: Arc<TuitionService>,
    /// Tutor applications.
    pub applications: Arc<ApplicationService>,
    /// Checkout and confirmation.
    pub payments: Arc<PaymentService>,
    /// Role dashboards.
    pub dashboard: Arc<DashboardService>,
}

impl AppState {
    /// Wires every service over one store and payment provider.
    #[must_use]
    pub fn new(
        store: Store,
        provider: Arc<dyn PaymentProvider>,
        checkout: CheckoutSettings,
        session_ttl: Duration,
    ) -> Self {
        let tuitions = TuitionService::new(store.clone());
        Self {
            accounts: Arc::new(AccountService::new(store.clone(), session_ttl)),
            applications: Arc::new(ApplicationService::new(store.clone(), tuitions.clone())),
            payments: Arc::new(PaymentService::new(
                store.clone(),
                tuitions.clone(),
                provider,
                checkout,
            )),
            dashboard: Arc::new(DashboardService::new(store)),
            tuitions: Arc::new(tuitions),
        }
    }
}
