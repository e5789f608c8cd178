// Health client - Facade over authorization, sample and statistics queries
use crate::application::authorization::{AuthorizationGate, FatalAuthorizationError};
use crate::application::clock::{Clock, SystemClock};
use crate::application::health_store::{AuthorizationStatus, HealthStore};
use crate::application::outcome::QueryOutcome;
use crate::application::sample_query::SampleQueryService;
use crate::application::statistics_query::StatisticsQueryService;
use crate::domain::data_type::{DataTypeIdentifier, RegistryError, TypeRegistry};
use crate::domain::sample::Sample;
use crate::domain::statistics::StatisticsCollection;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Entry point for callers.
///
/// Every operation comes in two forms. The async form returns a
/// [`QueryOutcome`]. The `*_then` form takes a one-shot handler, runs the query
/// on the client's executor and invokes the handler there, only on success.
/// Failures are logged once and the handler is dropped uninvoked, so callers
/// cannot tell missing data from missing permission from a broken store.
///
/// The returned [`JoinHandle`] resolves once delivery is done; dropping it
/// does not cancel the query.
#[derive(Clone)]
pub struct HealthClient {
    authorization: AuthorizationGate,
    samples: SampleQueryService,
    statistics: StatisticsQueryService,
    executor: Handle,
    on_fatal: FatalHandler,
}

/// Runs when the permission flow itself fails in the handler API. It must not
/// let the caller carry on as if authorization had happened.
pub type FatalHandler = Arc<dyn Fn(&FatalAuthorizationError) + Send + Sync>;

/// Default [`FatalHandler`]: exit with status 1
pub fn exit_process(_err: &FatalAuthorizationError) {
    std::process::exit(1);
}

impl HealthClient {
    pub fn new(store: Arc<dyn HealthStore>, registry: TypeRegistry, executor: Handle) -> Self {
        Self::with_clock(store, registry, Arc::new(SystemClock), executor)
    }

    pub fn with_clock(
        store: Arc<dyn HealthStore>,
        registry: TypeRegistry,
        clock: Arc<dyn Clock>,
        executor: Handle,
    ) -> Self {
        let registry = Arc::new(registry);
        Self {
            authorization: AuthorizationGate::new(store.clone(), registry.clone()),
            samples: SampleQueryService::new(store.clone(), registry.clone()),
            statistics: StatisticsQueryService::new(store, registry, clock),
            executor,
            on_fatal: Arc::new(exit_process),
        }
    }

    /// Replace what happens when the handler-API permission flow fails
    pub fn with_fatal_handler(mut self, on_fatal: FatalHandler) -> Self {
        self.on_fatal = on_fatal;
        self
    }

    /// Resolve the configured type names against the store and build a client.
    /// A resolution failure is a startup error.
    pub fn connect(
        store: Arc<dyn HealthStore>,
        configured: &HashMap<DataTypeIdentifier, String>,
        executor: Handle,
    ) -> Result<Self, RegistryError> {
        let registry = TypeRegistry::resolve(configured, |raw| store.resolve_type_token(raw))?;
        Ok(Self::new(store, registry, executor))
    }

    pub fn authorization(&self) -> &AuthorizationGate {
        &self.authorization
    }

    pub fn samples(&self) -> &SampleQueryService {
        &self.samples
    }

    pub fn statistics(&self) -> &StatisticsQueryService {
        &self.statistics
    }

    pub async fn request_authorization(
        &self,
        read: Option<HashSet<DataTypeIdentifier>>,
        write: Option<HashSet<DataTypeIdentifier>>,
    ) -> Result<(), FatalAuthorizationError> {
        self.authorization.request_authorization(read, write).await
    }

    pub async fn authorization_status(&self, data_type: DataTypeIdentifier) -> AuthorizationStatus {
        self.authorization.authorization_status(data_type).await
    }

    pub async fn query_samples(
        &self,
        data_type: DataTypeIdentifier,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        sort_descending: bool,
    ) -> QueryOutcome<Vec<Sample>> {
        self.samples
            .query_samples(data_type, from, to, sort_descending)
            .await
    }

    pub async fn heart_rate_samples(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> QueryOutcome<Vec<Sample>> {
        self.samples.heart_rate_samples(from, to).await
    }

    pub async fn resting_heart_rate_samples(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> QueryOutcome<Vec<Sample>> {
        self.samples.resting_heart_rate_samples(from, to).await
    }

    pub async fn heart_rate_variability_samples(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> QueryOutcome<Vec<Sample>> {
        self.samples.heart_rate_variability_samples(from, to).await
    }

    pub async fn workouts(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> QueryOutcome<Vec<Sample>> {
        self.samples.workouts(from, to).await
    }

    pub async fn daily_step_totals(&self) -> QueryOutcome<StatisticsCollection> {
        self.statistics.daily_step_totals().await
    }

    /// Run the permission flow and call `on_complete` once it finishes,
    /// granted or not. If the flow itself fails the fatal handler runs
    /// (by default the process exits) and `on_complete` is never called.
    pub fn request_authorization_then<F>(
        &self,
        read: Option<HashSet<DataTypeIdentifier>>,
        write: Option<HashSet<DataTypeIdentifier>>,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let gate = self.authorization.clone();
        let on_fatal = self.on_fatal.clone();
        self.executor.spawn(async move {
            match gate.request_authorization(read, write).await {
                Ok(()) => on_complete(),
                Err(err) => {
                    tracing::error!(error = %err, "Health data authorization could not run");
                    on_fatal(&err);
                }
            }
        })
    }

    pub fn query_samples_then<F>(
        &self,
        data_type: DataTypeIdentifier,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        sort_descending: bool,
        handler: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Vec<Sample>) + Send + 'static,
    {
        let samples = self.samples.clone();
        self.deliver(
            async move {
                samples
                    .query_samples(data_type, from, to, sort_descending)
                    .await
            },
            handler,
        )
    }

    pub fn heart_rate_samples_then<F>(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        handler: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Vec<Sample>) + Send + 'static,
    {
        self.query_samples_then(DataTypeIdentifier::HeartRate, from, to, false, handler)
    }

    pub fn resting_heart_rate_samples_then<F>(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        handler: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Vec<Sample>) + Send + 'static,
    {
        self.query_samples_then(DataTypeIdentifier::RestingHeartRate, from, to, false, handler)
    }

    pub fn heart_rate_variability_samples_then<F>(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        handler: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Vec<Sample>) + Send + 'static,
    {
        self.query_samples_then(
            DataTypeIdentifier::HeartRateVariability,
            from,
            to,
            false,
            handler,
        )
    }

    pub fn workouts_then<F>(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        handler: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Vec<Sample>) + Send + 'static,
    {
        self.query_samples_then(DataTypeIdentifier::Workout, from, to, true, handler)
    }

    pub fn daily_step_totals_then<F>(&self, handler: F) -> JoinHandle<()>
    where
        F: FnOnce(StatisticsCollection) + Send + 'static,
    {
        let statistics = self.statistics.clone();
        self.deliver(async move { statistics.daily_step_totals().await }, handler)
    }

    fn deliver<T, Q, F>(&self, query: Q, handler: F) -> JoinHandle<()>
    where
        T: Send + 'static,
        Q: Future<Output = QueryOutcome<T>> + Send + 'static,
        F: FnOnce(T) + Send + 'static,
    {
        self.executor.spawn(async move {
            // non-success outcomes were already logged when settled
            if let QueryOutcome::Success(value) = query.await {
                handler(value);
            }
        })
    }
}
