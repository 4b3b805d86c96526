// Repository module structure
pub mod errors;
mod in_memory;
mod period;
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use period::{PeriodRepository, PeriodRepositoryTrait};

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use period::tests;
