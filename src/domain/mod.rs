// Domain layer - Health data value types
pub mod data_type;
pub mod quantity;
pub mod sample;
pub mod statistics;
pub mod time_range;
