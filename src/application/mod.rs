// Application layer - Query construction and result delivery
pub mod authorization;
pub mod clock;
pub mod health_client;
pub mod health_store;
pub mod outcome;
pub mod sample_query;
pub mod statistics_query;

#[cfg(test)]
pub(crate) mod test_support;
