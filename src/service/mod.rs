//! Service layer: business logic orchestration.
//!
//! Services own a [`crate::persistence::Store`] handle and never see HTTP
//! types. Listing operations all go through [`crate::domain::ListQuery`].

pub mod accounts;
pub mod applications;
pub mod dashboard;
pub mod payments;
pub mod tuitions;

pub use accounts::AccountService;
pub use applications::ApplicationService;
pub use dashboard::DashboardService;
pub use payments::{CheckoutSettings, ConfirmOutcome, PaymentService};
pub use tuitions::TuitionService;
