//! Persistence layer: document collections over PostgreSQL or memory.
//!
//! [`Collection`] is the storage port every service talks to. It mirrors a
//! document store's surface: insert-one, find-one, paginated find, count,
//! `$set` update-one, delete-one, delete-many and a match/group/sum
//! aggregation.
//! Unique constraints are enforced by the store itself, so a racing second
//! insert is reported as [`InsertOutcome::Duplicate`] instead of succeeding.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{
    AggregateRow, AuthSession, Document, Filter, ListQuery, Page, PaymentRecord, TuitionRequest,
    TutorApplication, Update, User,
};
use crate::error::AppError;

pub use memory::MemoryCollection;
pub use postgres::PgCollection;

/// Result of an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The document was stored.
    Inserted,
    /// A unique constraint rejected the document; nothing was written.
    Duplicate,
}

/// Result of an update-one, in `{matched, modified}` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    /// Number of documents that matched the filter (0 or 1).
    pub matched: u64,
    /// Number of documents whose stored value changed (0 or 1).
    pub modified: u64,
}

/// Storage port for one document type.
#[async_trait]
pub trait Collection<D: Document>: Send + Sync + fmt::Debug {
    /// Inserts one document.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on backend failure. A unique
    /// constraint violation is **not** an error: it yields
    /// [`InsertOutcome::Duplicate`].
    async fn insert_one(&self, doc: D) -> Result<InsertOutcome, AppError>;

    /// Returns the first document matching every filter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on backend failure.
    async fn find_one(&self, filters: &[Filter<D::Field>]) -> Result<Option<D>, AppError>;

    /// Runs a filtered, sorted, paginated query.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on backend failure.
    async fn find(&self, query: &ListQuery<D::Field>) -> Result<Page<D>, AppError>;

    /// Counts documents matching every filter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on backend failure.
    async fn count(&self, filters: &[Filter<D::Field>]) -> Result<u64, AppError>;

    /// Applies a `$set` update to the first matching document.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] if the update touches an
    /// immutable field, or [`AppError::Persistence`] on backend failure.
    async fn update_one(
        &self,
        filters: &[Filter<D::Field>],
        update: &Update<D::Field>,
    ) -> Result<UpdateOutcome, AppError>;

    /// Deletes the first matching document. Returns whether one was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on backend failure.
    async fn delete_one(&self, filters: &[Filter<D::Field>]) -> Result<bool, AppError>;

    /// Deletes every matching document. Returns how many were deleted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on backend failure.
    async fn delete_many(&self, filters: &[Filter<D::Field>]) -> Result<u64, AppError>;

    /// `$match` → `$group` → `$sum`. Without `group_by` a single row is
    /// returned; `sum` of `None` yields totals of 0.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] when `sum` names a non-integer
    /// field, or [`AppError::Persistence`] on backend failure.
    async fn aggregate(
        &self,
        filters: &[Filter<D::Field>],
        group_by: Option<D::Field>,
        sum: Option<D::Field>,
    ) -> Result<Vec<AggregateRow>, AppError>;
}

/// Handles to every collection the service uses.
#[derive(Debug, Clone)]
pub struct Store {
    /// Registered users.
    pub users: Arc<dyn Collection<User>>,
    /// Bearer-token sessions.
    pub sessions: Arc<dyn Collection<AuthSession>>,
    /// Tuition requests.
    pub tuitions: Arc<dyn Collection<TuitionRequest>>,
    /// Tutor applications.
    pub applications: Arc<dyn Collection<TutorApplication>>,
    /// Payment records.
    pub payments: Arc<dyn Collection<PaymentRecord>>,
}

impl Store {
    /// A store backed by process memory. Contents are lost on restart.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryCollection::<User>::new()),
            sessions: Arc::new(MemoryCollection::<AuthSession>::new()),
            tuitions: Arc::new(MemoryCollection::<TuitionRequest>::new()),
            applications: Arc::new(MemoryCollection::<TutorApplication>::new()),
            payments: Arc::new(MemoryCollection::<PaymentRecord>::new()),
        }
    }

    /// A store backed by PostgreSQL through a shared connection pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PgCollection::<User>::new(pool.clone())),
            sessions: Arc::new(PgCollection::<AuthSession>::new(pool.clone())),
            tuitions: Arc::new(PgCollection::<TuitionRequest>::new(pool.clone())),
            applications: Arc::new(PgCollection::<TutorApplication>::new(pool.clone())),
            payments: Arc::new(PgCollection::<PaymentRecord>::new(pool.clone())),
        }
    }
}
