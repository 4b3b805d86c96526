// Engine bootstrap
// Wires configuration, the population model and period storage together.

use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use dotenv::dotenv;
use serde::Serialize;
use tracing::{info, warn};

use cycle_guide_data::database::{get_connection_info, initialize_database_pool, DatabaseConfig};
use cycle_guide_data::repository::{PeriodRepository, PeriodRepositoryTrait};

use crate::config::EngineConfig;
use crate::entities::insight::Insight;
use crate::entities::period::{CreatePeriodRequest, PeriodRecord};
use crate::entities::population::PopulationModel;
use crate::entities::prediction::{CycleStatistics, Prediction};
use crate::services::cycle::CycleService;
use crate::services::periods::{PeriodService, PeriodServiceError, PeriodServiceTrait};
use crate::services::population::load_population_model;

/// Everything a tracker screen shows for one user
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CycleOverview {
    pub prediction: Prediction,
    pub statistics: CycleStatistics,
    pub insights: Vec<Insight>,
    pub health_tip: String,
    pub days_since_last_period: Option<i64>,
    pub days_until_next_period: Option<i64>,
}

/// Period tracking plus cycle prediction over one repository
pub struct CycleEngine<R: PeriodRepositoryTrait = PeriodRepository> {
    periods: PeriodService<R>,
    cycles: CycleService,
}

impl CycleEngine<PeriodRepository> {
    /// Build the engine from the environment.
    ///
    /// Loads `.env` if present, trains the population model (falling back to
    /// the built-in one) and opens SQLite storage. When the database cannot be
    /// opened, periods are kept in memory for the life of the process.
    pub async fn bootstrap() -> anyhow::Result<Self> {
        if dotenv().is_err() {
            info!(".env file not found or unreadable, using process environment");
        }

        let config = EngineConfig::from_env().context("invalid engine configuration")?;
        let db_config = DatabaseConfig::from_env().context("invalid database configuration")?;

        let repository = match initialize_database_pool(&db_config) {
            Ok(pool) => {
                info!("Period storage: {}", get_connection_info(&pool));
                PeriodRepository::with_pool(pool)
            }
            Err(e) => {
                warn!("Failed to initialize database pool: {}. Periods will not be persisted", e);
                PeriodRepository::new()
            }
        };

        Ok(Self::load(config, repository).await)
    }
}

impl<R: PeriodRepositoryTrait + Send + Sync> CycleEngine<R> {
    /// Build the engine from explicit parts, loading the model from the configured source
    pub async fn load(config: EngineConfig, repository: R) -> Self {
        let model = load_population_model(config.training_source.as_ref()).await;
        Self::with_model(Arc::new(model), config, repository)
    }

    /// Build the engine around an already-loaded model
    pub fn with_model(model: Arc<PopulationModel>, config: EngineConfig, repository: R) -> Self {
        Self {
            periods: PeriodService::new(repository),
            cycles: CycleService::new(model, config),
        }
    }

    /// Period tracking operations
    pub fn periods(&self) -> &PeriodService<R> {
        &self.periods
    }

    /// Prediction and insight operations
    pub fn cycles(&self) -> &CycleService {
        &self.cycles
    }

    /// Log a period for its owner
    pub async fn log_period(&self, request: CreatePeriodRequest) -> Result<PeriodRecord, PeriodServiceError> {
        self.periods.add_period(request).await
    }

    /// Forecast the next cycle for an owner
    pub async fn predict_for(&self, owner_id: &str, user_age: Option<u32>) -> Result<Prediction, PeriodServiceError> {
        let records = self.periods.list_periods(owner_id).await?;
        Ok(self.cycles.predict_with_confidence(&records, user_age))
    }

    /// Everything shown on the tracker screen for an owner
    pub async fn overview(
        &self,
        owner_id: &str,
        user_age: Option<u32>,
        today: NaiveDate,
    ) -> Result<CycleOverview, PeriodServiceError> {
        let records = self.periods.list_periods(owner_id).await?;

        Ok(CycleOverview {
            prediction: self.cycles.predict_with_confidence(&records, user_age),
            statistics: self.cycles.cycle_statistics(&records),
            insights: self.cycles.generate_insights(&records, user_age),
            health_tip: self.cycles.health_tip(&records, user_age, today),
            days_since_last_period: self.cycles.days_since_last_period(&records, today),
            days_until_next_period: self.cycles.days_until_next_period(&records, today),
        })
    }
}
