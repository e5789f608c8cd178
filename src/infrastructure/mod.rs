// Infrastructure layer - Configuration and store adapters
pub mod config;
pub mod fixture;
pub mod memory_store;
