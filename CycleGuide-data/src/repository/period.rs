use chrono::Utc;
use tracing::{debug, error};
use uuid::Uuid;
use async_trait::async_trait;

use crate::models::period::{CreatePeriodRequest, PeriodRecord};
use crate::database::DatabasePool;
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for period records
///
/// Records are immutable once created; the contract is add / get /
/// list-by-owner / delete, and listing must preserve insertion order.
#[async_trait]
pub trait PeriodRepositoryTrait {
    /// Create a new period record from a request
    async fn create(&self, request: CreatePeriodRequest) -> Result<PeriodRecord, RepositoryError>;

    /// Get a period record by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<PeriodRecord>, RepositoryError>;

    /// List an owner's period records in insertion order
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<PeriodRecord>, RepositoryError>;

    /// Delete a period record by ID
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}

/// Repository for period records.
/// Uses SQLite when a pool is supplied and in-memory storage otherwise.
#[derive(Debug, Clone, Default)]
pub struct PeriodRepository {
    /// Database pool, when persistence is configured
    pool: Option<DatabasePool>,
    /// In-memory storage for when no database is configured
    storage: InMemoryStorage,
}

impl PeriodRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository backed by a database pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self {
            pool: Some(pool),
            storage: InMemoryStorage::new(),
        }
    }

    /// Whether records are persisted to a database
    pub fn is_persistent(&self) -> bool {
        self.pool.is_some()
    }
}

#[async_trait]
impl PeriodRepositoryTrait for PeriodRepository {
    async fn create(&self, request: CreatePeriodRequest) -> Result<PeriodRecord, RepositoryError> {
        let record = PeriodRecord {
            id: Uuid::new_v4().to_string(),
            owner_id: request.owner_id,
            start_date: request.start_date,
            end_date: request.end_date,
            flow: request.flow,
            notes: request.notes,
            created_at: Utc::now().to_rfc3339(),
        };

        match &self.pool {
            Some(pool) => {
                debug!("Storing period record in database: {}", record.id);
                DatabaseStorage::store_record(pool, &record).await.map_err(|e| {
                    error!("Failed to store period record in database: {}", e);
                    e
                })?;
                Ok(record)
            }
            None => self.storage.store_record(&record).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<PeriodRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::get_by_id(pool, id).await.map_err(|e| {
                error!("Failed to get period record {} from database: {}", id, e);
                e
            }),
            None => self.storage.get_by_id(id).await,
        }
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<PeriodRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::list_by_owner(pool, owner_id).await.map_err(|e| {
                error!("Failed to list period records from database: {}", e);
                e
            }),
            None => self.storage.list_by_owner(owner_id).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let removed = match &self.pool {
            Some(pool) => DatabaseStorage::delete(pool, id).await.map_err(|e| {
                error!("Failed to delete period record {} from database: {}", id, e);
                e
            })?,
            None => self.storage.delete(id).await?,
        };

        if removed {
            debug!("Deleted period record {}", id);
            Ok(())
        } else {
            Err(RepositoryError::NotFound(id.to_string()))
        }
    }
}

/// Mock period repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock implementation of PeriodRepository for testing
    #[derive(Default)]
    pub struct MockPeriodRepository {
        records: Mutex<Vec<PeriodRecord>>,
        fail_storage: bool,
    }

    impl MockPeriodRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined records
        pub fn with_records(records: Vec<PeriodRecord>) -> Self {
            Self {
                records: Mutex::new(records),
                fail_storage: false,
            }
        }

        /// Configure the mock so every call fails like an unavailable database
        pub fn with_storage_failure(mut self) -> Self {
            self.fail_storage = true;
            self
        }

        fn check_available(&self) -> Result<(), RepositoryError> {
            if self.fail_storage {
                Err(RepositoryError::Database(
                    "mock is configured to fail storage".to_string().into(),
                ))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl PeriodRepositoryTrait for MockPeriodRepository {
        async fn create(&self, request: CreatePeriodRequest) -> Result<PeriodRecord, RepositoryError> {
            self.check_available()?;
            let record = PeriodRecord {
                id: Uuid::new_v4().to_string(),
                owner_id: request.owner_id,
                start_date: request.start_date,
                end_date: request.end_date,
                flow: request.flow,
                notes: request.notes,
                created_at: Utc::now().to_rfc3339(),
            };
            self.records.lock()?.push(record.clone());
            Ok(record)
        }

        async fn get_by_id(&self, id: &str) -> Result<Option<PeriodRecord>, RepositoryError> {
            self.check_available()?;
            Ok(self.records.lock()?.iter().find(|r| r.id == id).cloned())
        }

        async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<PeriodRecord>, RepositoryError> {
            self.check_available()?;
            Ok(self
                .records
                .lock()?
                .iter()
                .filter(|r| r.owner_id == owner_id)
                .cloned()
                .collect())
        }

        async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
            self.check_available()?;
            let mut records = self.records.lock()?;
            let before = records.len();
            records.retain(|r| r.id != id);
            if records.len() == before {
                Err(RepositoryError::NotFound(id.to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[cfg(test)]
    fn request(owner: &str, start: &str, end: &str) -> CreatePeriodRequest {
        CreatePeriodRequest {
            owner_id: owner.to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            flow: "medium".to_string(),
            notes: None,
        }
    }

    #[cfg(test)]
    async fn exercise_contract<R: PeriodRepositoryTrait>(repo: &R) {
        let first = repo.create(request("alice", "2024-01-01", "2024-01-05")).await.unwrap();
        let _other = repo.create(request("bob", "2024-01-03", "2024-01-06")).await.unwrap();
        let second = repo.create(request("alice", "2023-12-01", "2023-12-04")).await.unwrap();

        // Listing keeps insertion order, not date order
        let listed = repo.list_by_owner("alice").await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);

        let fetched = repo.get_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(fetched.start_date, "2024-01-01");

        repo.delete(&first.id).await.unwrap();
        assert!(repo.get_by_id(&first.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&first.id).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert_eq!(repo.list_by_owner("alice").await.unwrap().len(), 1);
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_in_memory_repository_contract() {
        let repo = PeriodRepository::new();
        assert!(!repo.is_persistent());
        exercise_contract(&repo).await;
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_sqlite_repository_contract() {
        let pool = DatabasePool::in_memory().unwrap();
        let repo = PeriodRepository::with_pool(pool);
        assert!(repo.is_persistent());
        exercise_contract(&repo).await;
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_mock_repository_contract() {
        let repo = MockPeriodRepository::new();
        exercise_contract(&repo).await;
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_mock_storage_failure() {
        let repo = MockPeriodRepository::new().with_storage_failure();
        let result = repo.list_by_owner("alice").await;
        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }
}
