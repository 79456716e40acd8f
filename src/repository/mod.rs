//! The persistence collaborator boundary
//!
//! The engine performs no I/O besides `find` and `create` against this
//! trait. Failures propagate to the caller untouched.

pub mod memory;

pub use memory::MemoryPersistence;

use crate::domain::role::RecordId;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// An equality filter: the only shape of query the engine ever issues.
#[derive(Debug, Clone, PartialEq)]
pub struct Where {
    pub field: String,
    pub equals: Value,
}

impl Where {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            equals: value.into(),
        }
    }
}

/// A persisted record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub data: Value,
}

/// The result of a `find` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindResult {
    /// Total matches, regardless of the limit.
    pub total: u64,
    pub records: Vec<Record>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn find(&self, slug: &str, filter: &Where, limit: usize) -> Result<FindResult>;
    async fn create(&self, slug: &str, data: Value) -> Result<Record>;
}
