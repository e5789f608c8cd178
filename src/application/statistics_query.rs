// Statistics query service - Daily step totals anchored at today's midnight
use crate::application::clock::Clock;
use crate::application::health_store::{HealthStore, StatisticsCollectionQuery};
use crate::application::outcome::{settle, QueryFailure, QueryOutcome};
use crate::domain::data_type::{DataTypeIdentifier, TypeRegistry};
use crate::domain::statistics::{StatisticsCollection, StatisticsOptions};
use crate::domain::time_range::start_of_day;
use std::sync::Arc;

const DAILY_INTERVAL_DAYS: u32 = 1;

#[derive(Clone)]
pub struct StatisticsQueryService {
    store: Arc<dyn HealthStore>,
    registry: Arc<TypeRegistry>,
    clock: Arc<dyn Clock>,
}

impl StatisticsQueryService {
    pub fn new(
        store: Arc<dyn HealthStore>,
        registry: Arc<TypeRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            registry,
            clock,
        }
    }

    /// Anchor is local midnight of the clock's current day, read at call time
    pub fn build_daily_steps_query(&self) -> StatisticsCollectionQuery {
        StatisticsCollectionQuery {
            type_token: self.registry.token(DataTypeIdentifier::StepCount).clone(),
            predicate: None,
            options: StatisticsOptions::CumulativeSum,
            anchor: start_of_day(&self.clock.now()),
            interval_days: DAILY_INTERVAL_DAYS,
        }
    }

    /// Per-day step sums. The caller enumerates whichever days it needs.
    pub async fn daily_step_totals(&self) -> QueryOutcome<StatisticsCollection> {
        let query = self.build_daily_steps_query();
        tracing::debug!(
            token = %query.type_token,
            anchor = %query.anchor,
            "Executing daily step statistics query"
        );

        let result = self
            .store
            .execute_statistics_query(query)
            .await
            .map_err(QueryFailure::from)
            .and_then(|collection| collection.ok_or(QueryFailure::Absent));

        settle(DataTypeIdentifier::StepCount, result)
    }
}
