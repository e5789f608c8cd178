// Health telemetry - Authorization and time-ranged queries over a health data store
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::health_client::HealthClient;
pub use application::health_store::HealthStore;
pub use application::outcome::QueryOutcome;
pub use domain::data_type::DataTypeIdentifier;
