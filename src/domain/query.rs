//! Parameterized filter / sort / pagination builder shared by every
//! listing endpoint.
//!
//! A [`ListQuery`] is backend-neutral: the in-memory store evaluates it
//! directly against documents, the PostgreSQL store translates it into a
//! bound `WHERE ... ORDER BY ... LIMIT ... OFFSET` clause.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Maximum page size accepted by any listing.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default page size when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A scalar field value as seen by filters, sorts and `$set` updates.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum FieldValue {
    /// Absent / SQL `NULL`.
    Null,
    /// Signed integer (budgets, amounts).
    Int(i64),
    /// Free text, emails and enum discriminators.
    Text(String),
    /// UTC timestamp.
    Time(DateTime<Utc>),
    /// UUID identifier.
    Id(uuid::Uuid),
}

impl FieldValue {
    /// Returns the text payload, if this is a [`FieldValue::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is a [`FieldValue::Int`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns `true` for [`FieldValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the value as a grouping key.
    #[must_use]
    pub fn to_key(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Int(v) => Some(v.to_string()),
            Self::Text(s) => Some(s.clone()),
            Self::Time(t) => Some(t.to_rfc3339()),
            Self::Id(id) => Some(id.to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Time(value)
    }
}

impl From<uuid::Uuid> for FieldValue {
    fn from(value: uuid::Uuid) -> Self {
        Self::Id(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A single predicate applied to one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact equality.
    Eq(FieldValue),
    /// Case-insensitive substring match on text fields.
    Contains(String),
    /// Inclusive range; either bound may be open.
    Range {
        /// Lower bound (inclusive).
        min: Option<FieldValue>,
        /// Upper bound (inclusive).
        max: Option<FieldValue>,
    },
}

impl Predicate {
    /// Evaluates the predicate against a document's field value.
    ///
    /// `NULL` never matches anything, mirroring SQL semantics.
    #[must_use]
    pub fn matches(&self, value: &FieldValue) -> bool {
        if value.is_null() {
            return false;
        }
        match self {
            Self::Eq(expected) => value == expected,
            Self::Contains(needle) => value
                .as_text()
                .is_some_and(|hay| hay.to_lowercase().contains(&needle.to_lowercase())),
            Self::Range { min, max } => {
                let above = min.as_ref().is_none_or(|lo| {
                    matches!(
                        value.partial_cmp(lo),
                        Some(Ordering::Greater | Ordering::Equal)
                    )
                });
                let below = max.as_ref().is_none_or(|hi| {
                    matches!(value.partial_cmp(hi), Some(Ordering::Less | Ordering::Equal))
                });
                above && below
            }
        }
    }
}

/// A predicate bound to a collection field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<F> {
    /// Field the predicate applies to.
    pub field: F,
    /// The predicate itself.
    pub predicate: Predicate,
}

impl<F> Filter<F> {
    /// Equality filter.
    pub fn eq(field: F, value: impl Into<FieldValue>) -> Self {
        Self {
            field,
            predicate: Predicate::Eq(value.into()),
        }
    }

    /// Case-insensitive substring filter.
    pub fn contains(field: F, needle: impl Into<String>) -> Self {
        Self {
            field,
            predicate: Predicate::Contains(needle.into()),
        }
    }

    /// Inclusive range filter.
    pub fn range(field: F, min: Option<FieldValue>, max: Option<FieldValue>) -> Self {
        Self {
            field,
            predicate: Predicate::Range { min, max },
        }
    }
}

/// Free-text search: matches when **any** of the fields contains the term.
#[derive(Debug, Clone, PartialEq)]
pub struct Search<F> {
    /// Fields searched.
    pub fields: Vec<F>,
    /// Case-insensitive term.
    pub term: String,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// Sort specification. Ties are always broken by the document key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
    /// Field to sort on.
    pub field: F,
    /// Direction.
    pub direction: Direction,
}

/// Compares two optional field values the way PostgreSQL orders them:
/// `NULL` sorts after every value in ascending order.
#[must_use]
pub fn compare_nullable(a: &FieldValue, b: &FieldValue, direction: Direction) -> Ordering {
    let ordering = match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
    };
    match direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

/// 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Builds a page request, clamping `page >= 1` and
    /// `1 <= limit <= MAX_PAGE_SIZE`.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Page number (1-indexed).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of documents to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// A complete listing query over documents with field enum `F`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery<F> {
    /// Conjunctive filters.
    pub filters: Vec<Filter<F>>,
    /// Optional disjunctive free-text search.
    pub search: Option<Search<F>>,
    /// Optional sort; `None` means key order.
    pub sort: Option<Sort<F>>,
    /// Page window.
    pub page: PageRequest,
}

impl<F> Default for ListQuery<F> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            search: None,
            sort: None,
            page: PageRequest::default(),
        }
    }
}

impl<F> ListQuery<F> {
    /// An unfiltered query returning the first default-sized page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an arbitrary filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter<F>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds an equality filter.
    #[must_use]
    pub fn eq(self, field: F, value: impl Into<FieldValue>) -> Self {
        self.filter(Filter::eq(field, value))
    }

    /// Adds an equality filter when `value` is `Some`.
    #[must_use]
    pub fn eq_opt<V: Into<FieldValue>>(self, field: F, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    /// Adds a substring filter when `needle` is `Some` and non-blank.
    #[must_use]
    pub fn contains_opt(self, field: F, needle: Option<&str>) -> Self {
        match needle.map(str::trim).filter(|n| !n.is_empty()) {
            Some(n) => self.filter(Filter::contains(field, n)),
            None => self,
        }
    }

    /// Adds a range filter when at least one bound is present.
    #[must_use]
    pub fn range_opt(self, field: F, min: Option<FieldValue>, max: Option<FieldValue>) -> Self {
        if min.is_none() && max.is_none() {
            self
        } else {
            self.filter(Filter::range(field, min, max))
        }
    }

    /// Sets the free-text search when `term` is non-blank.
    #[must_use]
    pub fn search(mut self, fields: Vec<F>, term: Option<&str>) -> Self {
        self.search = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| Search {
                fields,
                term: t.to_string(),
            });
        self
    }

    /// Sets the sort.
    #[must_use]
    pub fn sort_by(mut self, field: F, direction: Direction) -> Self {
        self.sort = Some(Sort { field, direction });
        self
    }

    /// Sets the page window.
    #[must_use]
    pub fn page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Total number of matching items.
    pub total: u64,
    /// Total number of pages: `ceil(total / limit)`.
    pub total_pages: u64,
}

impl PaginationMeta {
    /// Computes metadata for a page window over `total` matching items.
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page(),
            limit: request.limit(),
            total,
            total_pages: total.div_ceil(u64::from(request.limit())),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

impl<T> Page<T> {
    /// Maps every item, keeping pagination metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// One row of an aggregation (`$match` → `$group` → `$sum`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AggregateRow {
    /// Group key; `None` when no grouping field was requested.
    pub key: Option<String>,
    /// Sum of the summed field (0 when nothing is summed).
    pub total: i64,
    /// Number of documents in the group.
    pub count: u64,
}
