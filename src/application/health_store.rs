// Store trait for health data access
use crate::domain::data_type::TypeToken;
use crate::domain::sample::Sample;
use crate::domain::statistics::{StatisticsCollection, StatisticsOptions};
use crate::domain::time_range::SamplePredicate;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDescriptor {
    StartDateDescending,
}

/// A predicate-bounded query against one sample type
#[derive(Debug, Clone, PartialEq)]
pub struct SampleQuery {
    pub type_token: TypeToken,
    pub predicate: SamplePredicate,
    /// `None` means unbounded
    pub limit: Option<usize>,
    pub sort: Option<SortDescriptor>,
}

/// A recurring-interval aggregation anchored at a local instant
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsCollectionQuery {
    pub type_token: TypeToken,
    pub predicate: Option<SamplePredicate>,
    pub options: StatisticsOptions,
    pub anchor: DateTime<Local>,
    pub interval_days: u32,
}

/// Sharing (write) permission state as reported by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    SharingDenied,
    SharingAuthorized,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("health data is not available")]
    Unavailable,
    #[error("authorization denied")]
    AuthorizationDenied,
    #[error("authorization not determined")]
    AuthorizationNotDetermined,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("store failure: {0}")]
    Transport(String),
}

#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Map a configured type name to the store's native token
    fn resolve_type_token(&self, raw: &str) -> Option<TypeToken>;

    /// Run the permission flow for the given token sets.
    /// `Ok` means the flow finished, not that anything was granted.
    async fn request_authorization(
        &self,
        read: &HashSet<TypeToken>,
        write: &HashSet<TypeToken>,
    ) -> Result<(), StoreError>;

    async fn authorization_status(&self, token: &TypeToken) -> AuthorizationStatus;

    /// `Ok(None)` is an absent result set
    async fn execute_sample_query(
        &self,
        query: SampleQuery,
    ) -> Result<Option<Vec<Sample>>, StoreError>;

    async fn execute_statistics_query(
        &self,
        query: StatisticsCollectionQuery,
    ) -> Result<Option<StatisticsCollection>, StoreError>;
}
