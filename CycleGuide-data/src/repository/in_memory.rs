use std::sync::{Arc, Mutex};

use crate::models::period::PeriodRecord;
use super::errors::RepositoryError;

/// In-memory storage implementation for period records
///
/// Records are kept in a `Vec` so listing preserves insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    records: Arc<Mutex<Vec<PeriodRecord>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record in memory
    pub async fn store_record(&self, record: &PeriodRecord) -> Result<PeriodRecord, RepositoryError> {
        let mut store = self.records.lock()?;
        if store.iter().any(|r| r.id == record.id) {
            return Err(RepositoryError::Validation(format!(
                "Period record {} already exists",
                record.id
            )));
        }
        store.push(record.clone());
        Ok(record.clone())
    }

    /// Get a record by ID from memory
    pub async fn get_by_id(&self, id: &str) -> Result<Option<PeriodRecord>, RepositoryError> {
        let store = self.records.lock()?;
        Ok(store.iter().find(|r| r.id == id).cloned())
    }

    /// List an owner's records in insertion order
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<PeriodRecord>, RepositoryError> {
        let store = self.records.lock()?;
        Ok(store
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    /// Delete a record, returning whether it existed
    pub async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut store = self.records.lock()?;
        let before = store.len();
        store.retain(|r| r.id != id);
        Ok(store.len() != before)
    }
}
