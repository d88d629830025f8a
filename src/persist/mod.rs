//! Persistence adapter.
//!
//! `PipelineStore` is the only boundary where the model talks to storage.
//! Writes are optimistic: an update names the version it last read.

pub mod record;

use std::collections::BTreeMap;

use chrono::Utc;
use uuid::Uuid;

pub use record::{PersistedPipeline, PipelineRecord, PipelineStatus};

use crate::error::StoreError;

pub trait PipelineStore {
    /// Store a new record. The store assigns the id, sets `version` to 1 and
    /// stamps both timestamps.
    fn create(&mut self, record: PipelineRecord) -> Result<String, StoreError>;

    /// Replace a stored record. `record.version` must equal the stored
    /// version; returns the new version.
    fn update(&mut self, id: &str, record: PipelineRecord) -> Result<u64, StoreError>;

    fn delete(&mut self, id: &str) -> Result<(), StoreError>;

    fn get_all(&self) -> Result<Vec<PipelineRecord>, StoreError>;

    fn get_by_id(&self, id: &str) -> Result<Option<PipelineRecord>, StoreError>;
}

/// Reference store backed by a map. Ids are UUIDv7, so `get_all` returns
/// records in creation order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: BTreeMap<String, PipelineRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PipelineStore for InMemoryStore {
    fn create(&mut self, mut record: PipelineRecord) -> Result<String, StoreError> {
        let id = Uuid::now_v7().to_string();
        let now = Utc::now();
        record.id = id.clone();
        record.version = 1;
        record.created_at = now;
        record.updated_at = now;
        tracing::info!(pipeline_id = %id, name = %record.name, "created pipeline");
        self.records.insert(id.clone(), record);
        Ok(id)
    }

    fn update(&mut self, id: &str, mut record: PipelineRecord) -> Result<u64, StoreError> {
        let stored = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if record.version != stored.version {
            tracing::warn!(
                pipeline_id = id,
                expected = record.version,
                actual = stored.version,
                "rejecting stale write"
            );
            return Err(StoreError::StaleWrite {
                id: id.to_string(),
                expected: record.version,
                actual: stored.version,
            });
        }
        record.id = id.to_string();
        record.version = stored.version + 1;
        record.created_at = stored.created_at;
        record.updated_at = Utc::now();
        let version = record.version;
        *stored = record;
        tracing::debug!(pipeline_id = id, version, "updated pipeline");
        Ok(version)
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.records
            .remove(id)
            .map(|_| tracing::info!(pipeline_id = id, "deleted pipeline"))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn get_all(&self) -> Result<Vec<PipelineRecord>, StoreError> {
        Ok(self.records.values().cloned().collect())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<PipelineRecord>, StoreError> {
        Ok(self.records.get(id).cloned())
    }
}
