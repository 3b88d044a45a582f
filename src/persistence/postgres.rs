//! PostgreSQL implementation of the persistence layer.
//!
//! [`PgCollection`] is generic over any [`PgDocument`]. SQL is assembled
//! with [`sqlx::QueryBuilder`]: column names come from static mappings and
//! every value is bound, never interpolated. Unique constraints declared in
//! `migrations/` back [`InsertOutcome::Duplicate`].

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::{Collection, InsertOutcome, UpdateOutcome};
use crate::domain::query::{Direction, Predicate, Search};
use crate::domain::{AggregateRow, Document, FieldValue, Filter, ListQuery, Page, PaginationMeta, Update};
use crate::error::AppError;

/// A [`Document`] with a table mapping.
pub trait PgDocument: Document {
    /// Row type decoded by sqlx.
    type Row: for<'r> FromRow<'r, PgRow> + Send + Unpin;

    /// Table name.
    const TABLE: &'static str;

    /// Primary key column.
    const KEY_COLUMN: &'static str;

    /// Every stored field, in insert / select order.
    const FIELDS: &'static [Self::Field];

    /// Fields backed by a `BIGINT` column (summable).
    const INTEGER_FIELDS: &'static [Self::Field];

    /// Column name for a field.
    fn column(field: Self::Field) -> &'static str;

    /// Converts a decoded row into the document.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] when a stored discriminator is
    /// not recognised.
    fn from_row(row: Self::Row) -> Result<Self, AppError>;
}

/// PostgreSQL-backed collection using `sqlx::PgPool`.
#[derive(Debug)]
pub struct PgCollection<D> {
    pool: PgPool,
    _doc: PhantomData<fn() -> D>,
}

impl<D: PgDocument> PgCollection<D> {
    /// Creates a collection over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _doc: PhantomData,
        }
    }

    fn select_columns() -> String {
        D::FIELDS
            .iter()
            .map(|f| D::column(*f))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn select_prefix() -> String {
        format!("SELECT {} FROM {}", Self::select_columns(), D::TABLE)
    }
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: &FieldValue) {
    match value {
        FieldValue::Null => {
            qb.push("NULL");
        }
        FieldValue::Int(v) => {
            qb.push_bind(*v);
        }
        FieldValue::Text(s) => {
            qb.push_bind(s.clone());
        }
        FieldValue::Time(t) => {
            qb.push_bind(*t);
        }
        FieldValue::Id(id) => {
            qb.push_bind(*id);
        }
    }
}

/// Escapes `LIKE` metacharacters and wraps the term in `%...%`.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_predicate(qb: &mut QueryBuilder<'static, Postgres>, column: &str, predicate: &Predicate) {
    match predicate {
        Predicate::Eq(value) => {
            qb.push(format!("{column} = "));
            push_value(qb, value);
        }
        Predicate::Contains(term) => {
            qb.push(format!("{column} ILIKE "));
            qb.push_bind(like_pattern(term));
        }
        Predicate::Range { min, max } => {
            qb.push("(TRUE");
            if let Some(lo) = min {
                qb.push(format!(" AND {column} >= "));
                push_value(qb, lo);
            }
            if let Some(hi) = max {
                qb.push(format!(" AND {column} <= "));
                push_value(qb, hi);
            }
            qb.push(")");
        }
    }
}

fn push_where<D: PgDocument>(
    qb: &mut QueryBuilder<'static, Postgres>,
    filters: &[Filter<D::Field>],
    search: Option<&Search<D::Field>>,
) {
    qb.push(" WHERE TRUE");
    for filter in filters {
        qb.push(" AND ");
        push_predicate(qb, D::column(filter.field), &filter.predicate);
    }
    if let Some(search) = search {
        qb.push(" AND (FALSE");
        for field in &search.fields {
            qb.push(format!(" OR {} ILIKE ", D::column(*field)));
            qb.push_bind(like_pattern(&search.term));
        }
        qb.push(")");
    }
}

/// `key IN (first matching key)`: the single-document target of
/// update-one / delete-one.
fn push_first_match<D: PgDocument>(
    qb: &mut QueryBuilder<'static, Postgres>,
    filters: &[Filter<D::Field>],
) {
    qb.push(format!(
        " WHERE {key} IN (SELECT {key} FROM {table}",
        key = D::KEY_COLUMN,
        table = D::TABLE
    ));
    push_where::<D>(qb, filters, None);
    qb.push(format!(" ORDER BY {} LIMIT 1)", D::KEY_COLUMN));
}

#[async_trait]
impl<D: PgDocument> Collection<D> for PgCollection<D> {
    async fn insert_one(&self, doc: D) -> Result<InsertOutcome, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            D::TABLE,
            Self::select_columns()
        ));
        for (i, field) in D::FIELDS.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_value(&mut qb, &doc.field(*field));
        }
        qb.push(format!(") ON CONFLICT DO NOTHING RETURNING {}", D::KEY_COLUMN));

        let inserted = qb.build().fetch_optional(&self.pool).await?;
        Ok(if inserted.is_some() {
            InsertOutcome::Inserted
        } else {
            tracing::debug!(collection = D::COLLECTION, key = %doc.key(), "unique constraint rejected insert");
            InsertOutcome::Duplicate
        })
    }

    async fn find_one(&self, filters: &[Filter<D::Field>]) -> Result<Option<D>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(Self::select_prefix());
        push_where::<D>(&mut qb, filters, None);
        qb.push(format!(" ORDER BY {} LIMIT 1", D::KEY_COLUMN));

        let row = qb.build_query_as::<D::Row>().fetch_optional(&self.pool).await?;
        row.map(D::from_row).transpose()
    }

    async fn find(&self, query: &ListQuery<D::Field>) -> Result<Page<D>, AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", D::TABLE));
        push_where::<D>(&mut count_qb, &query.filters, query.search.as_ref());
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(Self::select_prefix());
        push_where::<D>(&mut qb, &query.filters, query.search.as_ref());
        match query.sort {
            Some(sort) => {
                let direction = match sort.direction {
                    Direction::Asc => "ASC",
                    Direction::Desc => "DESC",
                };
                qb.push(format!(
                    " ORDER BY {} {direction}, {} ASC",
                    D::column(sort.field),
                    D::KEY_COLUMN
                ));
            }
            None => {
                qb.push(format!(" ORDER BY {} ASC", D::KEY_COLUMN));
            }
        }
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(query.page.limit()));
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX));

        let rows = qb.build_query_as::<D::Row>().fetch_all(&self.pool).await?;
        let data = rows
            .into_iter()
            .map(D::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            data,
            pagination: PaginationMeta::new(query.page, u64::try_from(total).unwrap_or(0)),
        })
    }

    async fn count(&self, filters: &[Filter<D::Field>]) -> Result<u64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", D::TABLE));
        push_where::<D>(&mut qb, filters, None);
        let total: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn update_one(
        &self,
        filters: &[Filter<D::Field>],
        update: &Update<D::Field>,
    ) -> Result<UpdateOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut select = QueryBuilder::<Postgres>::new(Self::select_prefix());
        push_where::<D>(&mut select, filters, None);
        select.push(format!(" ORDER BY {} LIMIT 1 FOR UPDATE", D::KEY_COLUMN));
        let Some(row) = select
            .build_query_as::<D::Row>()
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(UpdateOutcome::default());
        };

        // Validate through the document so immutable fields are rejected
        // the same way the in-memory store rejects them.
        let current = D::from_row(row)?;
        let mut updated = current.clone();
        for (field, value) in &update.sets {
            updated.set(*field, value.clone())?;
        }
        let changed: Vec<_> = update
            .sets
            .iter()
            .filter(|(field, _)| updated.field(*field) != current.field(*field))
            .collect();
        if changed.is_empty() {
            return Ok(UpdateOutcome {
                matched: 1,
                modified: 0,
            });
        }

        let mut qb = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", D::TABLE));
        for (i, (field, value)) in changed.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(format!("{} = ", D::column(*field)));
            push_value(&mut qb, value);
        }
        // FIELDS lists the key column first.
        let key_field = D::FIELDS
            .first()
            .copied()
            .ok_or_else(|| AppError::Internal(format!("{} has no fields", D::TABLE)))?;
        qb.push(format!(" WHERE {} = ", D::KEY_COLUMN));
        push_value(&mut qb, &current.field(key_field));
        qb.build().execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(UpdateOutcome {
            matched: 1,
            modified: 1,
        })
    }

    async fn delete_one(&self, filters: &[Filter<D::Field>]) -> Result<bool, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("DELETE FROM {}", D::TABLE));
        push_first_match::<D>(&mut qb, filters);
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, filters: &[Filter<D::Field>]) -> Result<u64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("DELETE FROM {}", D::TABLE));
        push_where::<D>(&mut qb, filters, None);
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn aggregate(
        &self,
        filters: &[Filter<D::Field>],
        group_by: Option<D::Field>,
        sum: Option<D::Field>,
    ) -> Result<Vec<AggregateRow>, AppError> {
        let total_expr = match sum {
            Some(field) if D::INTEGER_FIELDS.contains(&field) => {
                format!("COALESCE(SUM({}), 0)::BIGINT", D::column(field))
            }
            Some(_) => {
                return Err(AppError::InvalidRequest(format!(
                    "cannot sum non-integer field in {}",
                    D::COLLECTION
                )));
            }
            None => "0::BIGINT".to_string(),
        };
        let key_expr = group_by.map_or_else(
            || "NULL::TEXT".to_string(),
            |g| format!("{}::TEXT", D::column(g)),
        );

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {key_expr}, {total_expr}, COUNT(*) FROM {}",
            D::TABLE
        ));
        push_where::<D>(&mut qb, filters, None);
        if let Some(g) = group_by {
            qb.push(format!(" GROUP BY {} ORDER BY 1", D::column(g)));
        }

        let rows: Vec<(Option<String>, i64, i64)> =
            qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(key, total, count)| AggregateRow {
                key,
                total,
                count: u64::try_from(count).unwrap_or(0),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PaymentRecord, TuitionField, TuitionRequest};

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("math"), "%math%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn where_clause_binds_every_value() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM tuitions");
        let filters = [
            Filter::eq(TuitionField::Status, "Approved"),
            Filter::range(
                TuitionField::Budget,
                Some(FieldValue::Int(1000)),
                Some(FieldValue::Int(5000)),
            ),
        ];
        let search = Search {
            fields: vec![TuitionField::Subject, TuitionField::Location],
            term: "dhaka".to_string(),
        };
        push_where::<TuitionRequest>(&mut qb, &filters, Some(&search));
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM tuitions WHERE TRUE AND status = $1 AND (TRUE AND budget >= $2 AND budget <= $3) \
             AND (FALSE OR subject ILIKE $4 OR location ILIKE $5)"
        );
    }

    #[test]
    fn select_lists_columns_in_field_order() {
        assert!(PgCollection::<PaymentRecord>::select_prefix()
            .starts_with("SELECT id, transaction_id, amount, currency"));
    }
}
