//! In-memory persistence
//!
//! Backs bootstrap runs and tests; a real deployment supplies its own
//! [`Persistence`] implementation.

use super::{FindResult, Persistence, Record, Where};
use crate::domain::role::RecordId;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryPersistence {
    records: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored under the given slug.
    pub async fn count(&self, slug: &str) -> usize {
        self.records
            .read()
            .await
            .get(slug)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Removes the record with the given id. Returns whether anything was
    /// deleted.
    pub async fn remove(&self, slug: &str, id: &RecordId) -> bool {
        let mut records = self.records.write().await;
        match records.get_mut(slug) {
            Some(list) => {
                let before = list.len();
                list.retain(|r| &r.id != id);
                list.len() < before
            }
            None => false,
        }
    }

    fn matches(record: &Record, filter: &Where) -> bool {
        // a filter on the referenced value matches both scalar and
        // many-relationship fields
        match record.data.get(&filter.field) {
            Some(Value::Array(values)) => values.contains(&filter.equals),
            Some(value) => value == &filter.equals,
            None => false,
        }
    }
}

#[async_trait]
impl Persistence for MemoryPersistence {
    async fn find(&self, slug: &str, filter: &Where, limit: usize) -> Result<FindResult> {
        let records = self.records.read().await;
        let matches: Vec<&Record> = records
            .get(slug)
            .into_iter()
            .flatten()
            .filter(|r| Self::matches(r, filter))
            .collect();

        Ok(FindResult {
            total: matches.len() as u64,
            records: matches.into_iter().take(limit).cloned().collect(),
        })
    }

    async fn create(&self, slug: &str, data: Value) -> Result<Record> {
        let record = Record {
            id: RecordId::Text(Uuid::new_v4().to_string()),
            data,
        };
        self.records
            .write()
            .await
            .entry(slug.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }
}
