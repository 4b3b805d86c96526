// Storage models for the CycleGuide data layer
pub mod period;
