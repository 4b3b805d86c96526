// CycleGuide Domain
// Cycle prediction and insight engine for a personal period tracker

// Domain entities
pub mod entities;

// Statistics, training, prediction and insight services
pub mod services;

// Environment-driven configuration
pub mod config;

// Engine bootstrap
pub mod engine;

// Logging setup
pub mod telemetry;

// Re-export the data layer modules callers need for wiring
pub use cycle_guide_data::{database, training};

pub use config::EngineConfig;
pub use engine::{CycleEngine, CycleOverview};

// Testing utilities - only available for tests or with the mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
