use async_trait::async_trait;

use crate::shared::error::CrmError;

pub mod memory;

pub use memory::MemoryStore;

/// Store-assigned record identifier. Opaque to everything but the store.
pub type RecordId = i64;

/// A CRM record keyed by a store-assigned numeric id.
pub trait Record: Clone + Send + Sync + 'static {
    /// Lowercase entity name used in error messages and log lines.
    const KIND: &'static str;

    fn id(&self) -> RecordId;
    fn set_id(&mut self, id: RecordId);
}

/// CRUD boundary between the services and whatever holds the records.
///
/// Implementations return owned copies only; a caller can never obtain a
/// reference into store-internal state. `insert` assigns the id.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>, CrmError>;
    async fn get(&self, id: RecordId) -> Result<T, CrmError>;
    async fn insert(&self, record: T) -> Result<T, CrmError>;
    async fn update(&self, id: RecordId, record: T) -> Result<T, CrmError>;
    async fn delete(&self, id: RecordId) -> Result<(), CrmError>;
}

#[cfg(test)]
#[path = "store.test.rs"]
mod tests;
