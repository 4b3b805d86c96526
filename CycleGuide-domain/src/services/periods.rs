use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};
use validator::Validate;

use cycle_guide_data::repository::{PeriodRepository, PeriodRepositoryTrait, RepositoryError};

use crate::entities::conversions;
use crate::entities::period::{CreatePeriodRequest, PeriodRecord};

/// Period tracking service errors
#[derive(Debug, Error)]
pub enum PeriodServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Period not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// Trait for period tracking operations
#[async_trait]
pub trait PeriodServiceTrait {
    /// Validate a request to log a period
    fn validate_create_request(&self, request: &CreatePeriodRequest) -> Result<(), PeriodServiceError>;

    /// Log a new period
    async fn add_period(&self, request: CreatePeriodRequest) -> Result<PeriodRecord, PeriodServiceError>;

    /// Get a period by ID
    async fn get_period(&self, id: &str) -> Result<PeriodRecord, PeriodServiceError>;

    /// List a user's periods in the order they were logged
    async fn list_periods(&self, owner_id: &str) -> Result<Vec<PeriodRecord>, PeriodServiceError>;

    /// Delete a period by ID
    async fn delete_period(&self, id: &str) -> Result<(), PeriodServiceError>;
}

/// Period tracking service over a repository
pub struct PeriodService<R: PeriodRepositoryTrait> {
    repository: R,
}

impl<R: PeriodRepositoryTrait> PeriodService<R> {
    /// Create a new period service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> PeriodServiceError {
        match err {
            RepositoryError::NotFound(msg) => PeriodServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => PeriodServiceError::ValidationError(msg),
            _ => {
                error!("Period storage failed: {}", err);
                PeriodServiceError::RepositoryError(err.to_string())
            }
        }
    }

    fn to_domain(&self, record: cycle_guide_data::models::period::PeriodRecord) -> Result<PeriodRecord, PeriodServiceError> {
        let id = record.id.clone();
        conversions::convert_to_domain_record(record).map_err(|e| {
            error!("Stored period record {} is corrupt: {}", id, e);
            PeriodServiceError::RepositoryError(format!("Corrupt period record {}: {}", id, e))
        })
    }
}

#[async_trait]
impl<R: PeriodRepositoryTrait + Send + Sync> PeriodServiceTrait for PeriodService<R> {
    fn validate_create_request(&self, request: &CreatePeriodRequest) -> Result<(), PeriodServiceError> {
        if let Err(validation_errors) = request.validate() {
            let error_message = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let messages: Vec<String> = errors
                        .iter()
                        .map(|err| match &err.message {
                            Some(msg) => msg.to_string(),
                            None => format!("Invalid {}", field),
                        })
                        .collect();
                    format!("{}: {}", field, messages.join(", "))
                })
                .collect::<Vec<String>>()
                .join("; ");

            return Err(PeriodServiceError::ValidationError(error_message));
        }

        if request.start_date > request.end_date {
            return Err(PeriodServiceError::ValidationError(
                "Period end date cannot be before its start date".to_string(),
            ));
        }

        Ok(())
    }

    async fn add_period(&self, request: CreatePeriodRequest) -> Result<PeriodRecord, PeriodServiceError> {
        self.validate_create_request(&request)?;

        let data_request = conversions::convert_to_data_create_request(&request);
        let data_record = self
            .repository
            .create(data_request)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let record = self.to_domain(data_record)?;
        info!(
            "Logged period {} for {} starting {}",
            record.id, record.owner_id, record.start_date
        );
        Ok(record)
    }

    async fn get_period(&self, id: &str) -> Result<PeriodRecord, PeriodServiceError> {
        let data_record = self
            .repository
            .get_by_id(id)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| PeriodServiceError::NotFound(id.to_string()))?;

        self.to_domain(data_record)
    }

    async fn list_periods(&self, owner_id: &str) -> Result<Vec<PeriodRecord>, PeriodServiceError> {
        let data_records = self
            .repository
            .list_by_owner(owner_id)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        data_records
            .into_iter()
            .map(|record| self.to_domain(record))
            .collect()
    }

    async fn delete_period(&self, id: &str) -> Result<(), PeriodServiceError> {
        self.repository
            .delete(id)
            .await
            .map_err(|e| self.map_repo_error(e))?;
        info!("Deleted period {}", id);
        Ok(())
    }
}

/// Create a period service over the default in-memory repository
pub fn create_default_period_service() -> impl PeriodServiceTrait + Send + Sync {
    PeriodService::new(PeriodRepository::new())
}
