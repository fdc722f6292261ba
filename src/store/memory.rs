use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::RwLock;

use crate::shared::error::CrmError;
use crate::store::{Record, RecordId, RecordStore};

/// In-memory reference backend for [`RecordStore`].
///
/// Newest records sit at the front of the list. Ids are `max + 1` over the
/// records currently held, so deleting the highest-id record frees its id
/// for reuse.
pub struct MemoryStore<T> {
    records: Arc<RwLock<Vec<T>>>,
    latency_ms: Option<Range<u64>>,
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            latency_ms: None,
        }
    }

    /// Start from an existing record list, e.g. a fixture. Ids are taken
    /// as-is; the caller is responsible for their uniqueness.
    pub fn seeded(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            latency_ms: None,
        }
    }

    /// Sleep a uniformly random duration from `ms` before each operation,
    /// simulating a store round-trip. Bounded and always resolves.
    pub fn with_latency(mut self, ms: Range<u64>) -> Self {
        self.latency_ms = Some(ms);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(range) = &self.latency_ms {
            let ms = rand::thread_rng().gen_range(range.clone());
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for MemoryStore<T> {
    async fn list(&self) -> Result<Vec<T>, CrmError> {
        self.simulate_latency().await;
        Ok(self.records.read().await.clone())
    }

    async fn get(&self, id: RecordId) -> Result<T, CrmError> {
        self.simulate_latency().await;
        let records = self.records.read().await;
        records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| CrmError::NotFound(format!("{} {id}", T::KIND)))
    }

    async fn insert(&self, mut record: T) -> Result<T, CrmError> {
        self.simulate_latency().await;
        let mut records = self.records.write().await;
        let next_id = records.iter().map(|r| r.id()).max().unwrap_or(0) + 1;
        record.set_id(next_id);
        records.insert(0, record.clone());
        Ok(record)
    }

    async fn update(&self, id: RecordId, mut record: T) -> Result<T, CrmError> {
        self.simulate_latency().await;
        let mut records = self.records.write().await;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| CrmError::NotFound(format!("{} {id}", T::KIND)))?;
        // The id never changes, whatever the caller put in the record.
        record.set_id(id);
        *slot = record.clone();
        Ok(record)
    }

    async fn delete(&self, id: RecordId) -> Result<(), CrmError> {
        self.simulate_latency().await;
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| CrmError::NotFound(format!("{} {id}", T::KIND)))?;
        records.remove(index);
        Ok(())
    }
}
