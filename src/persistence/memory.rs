//! In-process document collection.
//!
//! [`MemoryCollection`] keeps documents in a `BTreeMap` keyed by
//! [`Document::key`] behind a single [`tokio::sync::RwLock`]. Reads run
//! concurrently; writes are serialized, so the uniqueness check and the
//! insert in [`Collection::insert_one`] are one atomic step.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Collection, InsertOutcome, UpdateOutcome};
use crate::domain::query::{Search, Sort, compare_nullable};
use crate::domain::{
    AggregateRow, Document, FieldValue, Filter, ListQuery, Page, PaginationMeta, Update,
};
use crate::error::AppError;

/// Document collection held in process memory.
#[derive(Debug)]
pub struct MemoryCollection<D: Document> {
    docs: RwLock<BTreeMap<String, D>>,
}

impl<D: Document> MemoryCollection<D> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<D: Document> Default for MemoryCollection<D> {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_all<D: Document>(doc: &D, filters: &[Filter<D::Field>]) -> bool {
    filters
        .iter()
        .all(|f| f.predicate.matches(&doc.field(f.field)))
}

fn matches_search<D: Document>(doc: &D, search: Option<&Search<D::Field>>) -> bool {
    let Some(search) = search else {
        return true;
    };
    let needle = search.term.to_lowercase();
    search.fields.iter().any(|field| {
        doc.field(*field)
            .as_text()
            .is_some_and(|hay| hay.to_lowercase().contains(&needle))
    })
}

fn sort_docs<D: Document>(docs: &mut [D], sort: Option<Sort<D::Field>>) {
    docs.sort_by(|a, b| {
        let primary = sort.map_or(std::cmp::Ordering::Equal, |s| {
            compare_nullable(&a.field(s.field), &b.field(s.field), s.direction)
        });
        primary.then_with(|| a.key().cmp(&b.key()))
    });
}

#[async_trait]
impl<D: Document> Collection<D> for MemoryCollection<D> {
    async fn insert_one(&self, doc: D) -> Result<InsertOutcome, AppError> {
        let mut map = self.docs.write().await;
        let key = doc.key();
        if map.contains_key(&key) {
            return Ok(InsertOutcome::Duplicate);
        }
        let unique = doc.unique_keys();
        let clash = !unique.is_empty()
            && map
                .values()
                .any(|existing| existing.unique_keys().iter().any(|k| unique.contains(k)));
        if clash {
            return Ok(InsertOutcome::Duplicate);
        }
        map.insert(key, doc);
        Ok(InsertOutcome::Inserted)
    }

    async fn find_one(&self, filters: &[Filter<D::Field>]) -> Result<Option<D>, AppError> {
        let map = self.docs.read().await;
        Ok(map.values().find(|d| matches_all(*d, filters)).cloned())
    }

    async fn find(&self, query: &ListQuery<D::Field>) -> Result<Page<D>, AppError> {
        let map = self.docs.read().await;
        let mut matched: Vec<D> = map
            .values()
            .filter(|d| matches_all(*d, &query.filters) && matches_search(*d, query.search.as_ref()))
            .cloned()
            .collect();
        drop(map);

        sort_docs(&mut matched, query.sort);

        let total = matched.len() as u64;
        let offset = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
        let data = matched
            .into_iter()
            .skip(offset)
            .take(query.page.limit() as usize)
            .collect();

        Ok(Page {
            data,
            pagination: PaginationMeta::new(query.page, total),
        })
    }

    async fn count(&self, filters: &[Filter<D::Field>]) -> Result<u64, AppError> {
        let map = self.docs.read().await;
        Ok(map.values().filter(|d| matches_all(*d, filters)).count() as u64)
    }

    async fn update_one(
        &self,
        filters: &[Filter<D::Field>],
        update: &Update<D::Field>,
    ) -> Result<UpdateOutcome, AppError> {
        let mut map = self.docs.write().await;
        let Some(doc) = map.values_mut().find(|d| matches_all(&**d, filters)) else {
            return Ok(UpdateOutcome::default());
        };

        // Apply to a copy so a rejected assignment leaves the stored document untouched.
        let mut updated = doc.clone();
        for (field, value) in &update.sets {
            updated.set(*field, value.clone())?;
        }
        let modified = update
            .sets
            .iter()
            .any(|(field, _)| updated.field(*field) != doc.field(*field));
        *doc = updated;

        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(modified),
        })
    }

    async fn delete_one(&self, filters: &[Filter<D::Field>]) -> Result<bool, AppError> {
        let mut map = self.docs.write().await;
        let key = map
            .iter()
            .find(|(_, d)| matches_all(*d, filters))
            .map(|(k, _)| k.clone());
        Ok(key.is_some_and(|k| map.remove(&k).is_some()))
    }

    async fn delete_many(&self, filters: &[Filter<D::Field>]) -> Result<u64, AppError> {
        let mut map = self.docs.write().await;
        let before = map.len();
        map.retain(|_, d| !matches_all(&*d, filters));
        Ok((before - map.len()) as u64)
    }

    async fn aggregate(
        &self,
        filters: &[Filter<D::Field>],
        group_by: Option<D::Field>,
        sum: Option<D::Field>,
    ) -> Result<Vec<AggregateRow>, AppError> {
        let map = self.docs.read().await;
        let mut groups: HashMap<Option<String>, (i64, u64)> = HashMap::new();
        if group_by.is_none() {
            groups.insert(None, (0, 0));
        }

        for doc in map.values().filter(|d| matches_all(*d, filters)) {
            let key = group_by.and_then(|g| doc.field(g).to_key());
            let amount = match sum.map(|f| doc.field(f)) {
                None | Some(FieldValue::Null) => 0,
                Some(FieldValue::Int(v)) => v,
                Some(_) => {
                    return Err(AppError::InvalidRequest(format!(
                        "cannot sum non-integer field in {}",
                        D::COLLECTION
                    )));
                }
            };
            let entry = groups.entry(key).or_insert((0, 0));
            entry.0 = entry.0.saturating_add(amount);
            entry.1 += 1;
        }

        let mut rows: Vec<AggregateRow> = groups
            .into_iter()
            .map(|(key, (total, count))| AggregateRow { key, total, count })
            .collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(rows)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::{
        Direction, PageRequest, PaymentField, PaymentRecord, TuitionField, TuitionId,
        TuitionRequest, TuitionStatus,
    };
    use crate::domain::{ApplicationId, PaymentId};

    fn tuition(subject: &str, budget: i64, minutes_ago: i64) -> TuitionRequest {
        TuitionRequest {
            id: TuitionId::new(),
            student_email: "s@example.com".to_string(),
            subject: subject.to_string(),
            class_level: "Class 9".to_string(),
            location: "Dhaka".to_string(),
            budget,
            schedule: None,
            description: None,
            status: TuitionStatus::Pending,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    fn payment(tx: &str, amount: i64, currency: &str) -> PaymentRecord {
        PaymentRecord {
            id: PaymentId::new(),
            transaction_id: tx.to_string(),
            amount,
            currency: currency.to_string(),
            payer_email: "s@example.com".to_string(),
            payee_email: "t@example.com".to_string(),
            application_id: ApplicationId::new(),
            tuition_id: TuitionId::new(),
            payment_status: "paid".to_string(),
            paid_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_and_find_one() {
        let col = MemoryCollection::new();
        let doc = tuition("Math", 5000, 0);
        let id = doc.id;

        let Ok(outcome) = col.insert_one(doc).await else {
            panic!("insert failed");
        };
        assert_eq!(outcome, InsertOutcome::Inserted);

        let Ok(found) = col.find_one(&[Filter::eq(TuitionField::Id, id)]).await else {
            panic!("find failed");
        };
        assert_eq!(found.map(|t| t.budget), Some(5000));
    }

    #[tokio::test]
    async fn unique_key_rejects_second_insert() {
        let col = MemoryCollection::new();
        let first = col.insert_one(payment("pi_1", 100, "usd")).await;
        let second = col.insert_one(payment("pi_1", 100, "usd")).await;
        assert!(matches!(first, Ok(InsertOutcome::Inserted)));
        assert!(matches!(second, Ok(InsertOutcome::Duplicate)));
        assert!(matches!(col.count(&[]).await, Ok(1)));
    }

    #[tokio::test]
    async fn concurrent_inserts_store_exactly_one() {
        let col = Arc::new(MemoryCollection::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let col = Arc::clone(&col);
            handles.push(tokio::spawn(async move {
                col.insert_one(payment("pi_race", 100, "usd")).await
            }));
        }
        let mut inserted = 0;
        for handle in handles {
            if let Ok(Ok(InsertOutcome::Inserted)) = handle.await {
                inserted += 1;
            }
        }
        assert_eq!(inserted, 1);
        assert!(matches!(col.count(&[]).await, Ok(1)));
    }

    #[tokio::test]
    async fn pages_concatenate_to_full_sorted_set() {
        let col = MemoryCollection::new();
        for i in 0..23 {
            // Repeated budgets force the key tie-break.
            let _ = col.insert_one(tuition("Physics", 1000 + (i % 4) * 500, i)).await;
        }
        let _ = col.insert_one(tuition("Chemistry", 99_999, 0)).await;

        let base = ListQuery::new()
            .eq(TuitionField::Subject, "Physics")
            .sort_by(TuitionField::Budget, Direction::Desc);

        let Ok(all) = col.find(&base.clone().page(PageRequest::new(1, 100))).await else {
            panic!("find failed");
        };
        assert_eq!(all.pagination.total, 23);

        let mut collected = Vec::new();
        let mut page = 1;
        loop {
            let Ok(chunk) = col.find(&base.clone().page(PageRequest::new(page, 5))).await else {
                panic!("find failed");
            };
            assert_eq!(chunk.pagination.total_pages, 5);
            if chunk.data.is_empty() {
                break;
            }
            collected.extend(chunk.data);
            page += 1;
        }
        assert_eq!(page, 6);
        assert_eq!(collected, all.data);
        assert!(collected.windows(2).all(|w| match w {
            [a, b] => a.budget >= b.budget,
            _ => true,
        }));
    }

    #[tokio::test]
    async fn search_is_disjunctive() {
        let col = MemoryCollection::new();
        let _ = col.insert_one(tuition("Mathematics", 1, 0)).await;
        let mut other = tuition("English", 1, 0);
        other.location = "Mathura".to_string();
        let _ = col.insert_one(other).await;
        let _ = col.insert_one(tuition("Biology", 1, 0)).await;

        let query = ListQuery::new().search(
            vec![TuitionField::Subject, TuitionField::Location],
            Some("math"),
        );
        let Ok(page) = col.find(&query).await else {
            panic!("find failed");
        };
        assert_eq!(page.pagination.total, 2);
    }

    #[tokio::test]
    async fn update_one_reports_matched_and_modified() {
        let col = MemoryCollection::new();
        let doc = tuition("Math", 5000, 0);
        let id = doc.id;
        let _ = col.insert_one(doc).await;

        let update = Update::new().set(TuitionField::Status, TuitionStatus::Approved);
        let filters = [Filter::eq(TuitionField::Id, id)];

        let Ok(first) = col.update_one(&filters, &update).await else {
            panic!("update failed");
        };
        assert_eq!(first, UpdateOutcome { matched: 1, modified: 1 });

        let Ok(second) = col.update_one(&filters, &update).await else {
            panic!("update failed");
        };
        assert_eq!(second, UpdateOutcome { matched: 1, modified: 0 });

        let Ok(missing) = col
            .update_one(&[Filter::eq(TuitionField::Id, TuitionId::new())], &update)
            .await
        else {
            panic!("update failed");
        };
        assert_eq!(missing.matched, 0);
    }

    #[tokio::test]
    async fn update_of_immutable_field_leaves_document_intact() {
        let col = MemoryCollection::new();
        let doc = tuition("Math", 5000, 0);
        let id = doc.id;
        let _ = col.insert_one(doc).await;

        let update = Update::new()
            .set(TuitionField::Budget, 7000_i64)
            .set(TuitionField::StudentEmail, "x@example.com");
        let filters = [Filter::eq(TuitionField::Id, id)];
        assert!(col.update_one(&filters, &update).await.is_err());

        let Ok(Some(stored)) = col.find_one(&filters).await else {
            panic!("document vanished");
        };
        assert_eq!(stored.budget, 5000);
    }

    #[tokio::test]
    async fn delete_one_removes_first_match() {
        let col = MemoryCollection::new();
        let doc = tuition("Math", 5000, 0);
        let id = doc.id;
        let _ = col.insert_one(doc).await;

        let filters = [Filter::eq(TuitionField::Id, id)];
        assert!(matches!(col.delete_one(&filters).await, Ok(true)));
        assert!(matches!(col.delete_one(&filters).await, Ok(false)));
    }

    #[tokio::test]
    async fn delete_many_removes_every_match() {
        let col = MemoryCollection::new();
        let _ = col.insert_one(tuition("Math", 3000, 0)).await;
        let _ = col.insert_one(tuition("Physics", 5000, 1)).await;
        let _ = col.insert_one(tuition("Chemistry", 9000, 2)).await;

        let cheap = [Filter::range(TuitionField::Budget, None, Some(FieldValue::Int(5000)))];
        assert!(matches!(col.delete_many(&cheap).await, Ok(2)));
        assert!(matches!(col.delete_many(&cheap).await, Ok(0)));
        assert!(matches!(col.count(&[]).await, Ok(1)));
    }

    #[tokio::test]
    async fn aggregate_groups_and_sums() {
        let col = MemoryCollection::new();
        let _ = col.insert_one(payment("pi_1", 500, "usd")).await;
        let _ = col.insert_one(payment("pi_2", 700, "usd")).await;
        let _ = col.insert_one(payment("pi_3", 900, "bdt")).await;

        let Ok(rows) = col
            .aggregate(&[], Some(PaymentField::Currency), Some(PaymentField::Amount))
            .await
        else {
            panic!("aggregate failed");
        };
        assert_eq!(
            rows,
            vec![
                AggregateRow {
                    key: Some("bdt".to_string()),
                    total: 900,
                    count: 1
                },
                AggregateRow {
                    key: Some("usd".to_string()),
                    total: 1200,
                    count: 2
                },
            ]
        );

        let Ok(ungrouped) = col
            .aggregate(
                &[Filter::eq(PaymentField::Currency, "eur")],
                None,
                Some(PaymentField::Amount),
            )
            .await
        else {
            panic!("aggregate failed");
        };
        assert_eq!(
            ungrouped,
            vec![AggregateRow {
                key: None,
                total: 0,
                count: 0
            }]
        );
    }

    #[tokio::test]
    async fn aggregate_rejects_text_sum() {
        let col = MemoryCollection::new();
        let _ = col.insert_one(payment("pi_1", 500, "usd")).await;
        let result = col
            .aggregate(&[], None, Some(PaymentField::Currency))
            .await;
        assert!(result.is_err());
    }
}
