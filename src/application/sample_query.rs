// Sample query service - Time-bounded queries for one data type
use crate::application::health_store::{HealthStore, SampleQuery, SortDescriptor};
use crate::application::outcome::{settle, QueryFailure, QueryOutcome};
use crate::domain::data_type::{DataTypeIdentifier, TypeRegistry, TypeToken};
use crate::domain::sample::Sample;
use crate::domain::time_range::SamplePredicate;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct SampleQueryService {
    store: Arc<dyn HealthStore>,
    registry: Arc<TypeRegistry>,
}

impl SampleQueryService {
    pub fn new(store: Arc<dyn HealthStore>, registry: Arc<TypeRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn build_query(
        &self,
        data_type: DataTypeIdentifier,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        sort_descending: bool,
    ) -> SampleQuery {
        SampleQuery {
            type_token: self.registry.token(data_type).clone(),
            predicate: SamplePredicate::strict(from, to),
            limit: None,
            sort: sort_descending.then_some(SortDescriptor::StartDateDescending),
        }
    }

    /// Samples fully contained in `[from, to]`.
    ///
    /// Without `sort_descending` the order is whatever the store returns.
    pub async fn query_samples(
        &self,
        data_type: DataTypeIdentifier,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        sort_descending: bool,
    ) -> QueryOutcome<Vec<Sample>> {
        if !data_type.supports_sample_queries() {
            return settle(data_type, Err(QueryFailure::Unsupported(data_type)));
        }

        let query = self.build_query(data_type, from, to, sort_descending);
        tracing::debug!(
            %data_type,
            token = %query.type_token,
            %from,
            %to,
            sort_descending,
            "Executing sample query"
        );

        let token = query.type_token.clone();
        let result = self
            .store
            .execute_sample_query(query)
            .await
            .map_err(QueryFailure::from)
            .and_then(|samples| validate_samples(data_type, &token, samples))
            .map(|mut samples| {
                if sort_descending {
                    samples.sort_by(|a, b| b.start().cmp(&a.start()));
                }
                samples
            });

        settle(data_type, result)
    }

    pub async fn heart_rate_samples(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> QueryOutcome<Vec<Sample>> {
        self.query_samples(DataTypeIdentifier::HeartRate, from, to, false)
            .await
    }

    pub async fn resting_heart_rate_samples(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> QueryOutcome<Vec<Sample>> {
        self.query_samples(DataTypeIdentifier::RestingHeartRate, from, to, false)
            .await
    }

    pub async fn heart_rate_variability_samples(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> QueryOutcome<Vec<Sample>> {
        self.query_samples(DataTypeIdentifier::HeartRateVariability, from, to, false)
            .await
    }

    /// Workouts, most recent first
    pub async fn workouts(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> QueryOutcome<Vec<Sample>> {
        self.query_samples(DataTypeIdentifier::Workout, from, to, true)
            .await
    }
}

fn validate_samples(
    data_type: DataTypeIdentifier,
    token: &TypeToken,
    samples: Option<Vec<Sample>>,
) -> Result<Vec<Sample>, QueryFailure> {
    let samples = samples.ok_or(QueryFailure::Absent)?;
    let expected = data_type.sample_kind();

    if let Some(stray) = samples
        .iter()
        .find(|s| s.kind() != expected || s.type_token() != token)
    {
        return Err(QueryFailure::Malformed(format!(
            "expected {:?} samples of {}, got {:?} sample of {}",
            expected,
            token,
            stray.kind(),
            stray.type_token()
        )));
    }

    Ok(samples)
}
