//! Domain layer: marketplace entities, identifiers and the query model.
//!
//! Entities implement [`Document`] so the generic collections in
//! [`crate::persistence`] can filter, sort, group and `$set` them by field.

pub mod application;
pub mod document;
pub mod ids;
pub mod payment;
pub mod query;
pub mod tuition;
pub mod user;

pub use application::{ApplicationField, ApplicationStatus, TutorApplication};
pub use document::{Document, Update};
pub use ids::{ApplicationId, PaymentId, TuitionId};
pub use payment::{PaymentField, PaymentRecord};
pub use query::{
    AggregateRow, Direction, FieldValue, Filter, ListQuery, Page, PageRequest, PaginationMeta,
};
pub use tuition::{TuitionField, TuitionRequest, TuitionStatus};
pub use user::{AuthSession, Role, SessionField, User, UserField};
