//! # tuition-manager
//!
//! REST backend for a tuition marketplace. Students post tuition requests,
//! admins approve them onto the public board, tutors apply, and students
//! pay for an application through a hosted checkout. Confirming a payment
//! is idempotent per provider transaction: the payment record is inserted
//! under a unique key first, and only the request that wins that insert
//! approves the application.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers + role gate (api/)
//!     │
//!     ├── Account / Tuition / Application / Payment / Dashboard services (service/)
//!     │         │
//!     │         └── PaymentProvider (payments/) ──► Stripe Checkout
//!     │
//!     └── Collection<D> (persistence/)
//!             ├── PostgreSQL
//!             └── in-memory
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod payments;
pub mod persistence;
pub mod service;
