//! Field-addressable documents and `$set` updates.
//!
//! Every stored entity implements [`Document`], which lets the generic
//! collections in [`crate::persistence`] filter, sort, group and update it
//! by field without knowing its concrete type.

use std::fmt;

use chrono::{DateTime, Utc};

use super::query::FieldValue;
use crate::error::AppError;

/// A stored entity whose fields can be addressed through `Self::Field`.
pub trait Document: Clone + Send + Sync + fmt::Debug + 'static {
    /// Field enum for this collection.
    type Field: Copy + Eq + Send + Sync + fmt::Debug + 'static;

    /// Collection name, used in logs and error messages.
    const COLLECTION: &'static str;

    /// Primary key rendered as a string.
    fn key(&self) -> String;

    /// Secondary unique constraints, each rendered as `"<name>:<value>"`.
    ///
    /// Two documents in one collection may never share any entry.
    fn unique_keys(&self) -> Vec<String> {
        Vec::new()
    }

    /// Reads one field.
    fn field(&self, field: Self::Field) -> FieldValue;

    /// Overwrites one field (`$set`).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] if the field is immutable or the
    /// value has the wrong shape.
    fn set(&mut self, field: Self::Field, value: FieldValue) -> Result<(), AppError>;
}

/// A `$set` update: an ordered list of field assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct Update<F> {
    /// Field assignments applied in order.
    pub sets: Vec<(F, FieldValue)>,
}

impl<F> Default for Update<F> {
    fn default() -> Self {
        Self { sets: Vec::new() }
    }
}

impl<F> Update<F> {
    /// An empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    #[must_use]
    pub fn set(mut self, field: F, value: impl Into<FieldValue>) -> Self {
        self.sets.push((field, value.into()));
        self
    }

    /// Adds an assignment when `value` is `Some`.
    #[must_use]
    pub fn set_opt<V: Into<FieldValue>>(self, field: F, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(field, v),
            None => self,
        }
    }

    /// Returns `true` when there is nothing to set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Extracts a required text value for a `$set`.
///
/// # Errors
///
/// Returns [`AppError::InvalidRequest`] when `value` is not text.
pub fn text(field: &str, value: FieldValue) -> Result<String, AppError> {
    match value {
        FieldValue::Text(s) => Ok(s),
        other => Err(AppError::InvalidRequest(format!(
            "{field} expects text, got {other:?}"
        ))),
    }
}

/// Extracts an optional text value for a `$set`.
///
/// # Errors
///
/// Returns [`AppError::InvalidRequest`] when `value` is neither text nor null.
pub fn optional_text(field: &str, value: FieldValue) -> Result<Option<String>, AppError> {
    match value {
        FieldValue::Null => Ok(None),
        other => text(field, other).map(Some),
    }
}

/// Extracts a required integer value for a `$set`.
///
/// # Errors
///
/// Returns [`AppError::InvalidRequest`] when `value` is not an integer.
pub fn int(field: &str, value: FieldValue) -> Result<i64, AppError> {
    value
        .as_int()
        .ok_or_else(|| AppError::InvalidRequest(format!("{field} expects an integer")))
}

/// Extracts an optional timestamp for a `$set`.
///
/// # Errors
///
/// Returns [`AppError::InvalidRequest`] when `value` is neither a timestamp
/// nor null.
pub fn optional_time(field: &str, value: FieldValue) -> Result<Option<DateTime<Utc>>, AppError> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Time(t) => Ok(Some(t)),
        other => Err(AppError::InvalidRequest(format!(
            "{field} expects a timestamp, got {other:?}"
        ))),
    }
}

/// Rejects a `$set` on a field that never changes after insert.
///
/// # Errors
///
/// Always returns [`AppError::InvalidRequest`].
pub fn immutable<T>(collection: &str, field: impl fmt::Debug) -> Result<T, AppError> {
    Err(AppError::InvalidRequest(format!(
        "{collection}.{field:?} cannot be updated"
    )))
}
