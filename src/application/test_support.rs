// Scripted store and log capture shared by application tests
use crate::application::health_store::{
    AuthorizationStatus, HealthStore, SampleQuery, StatisticsCollectionQuery, StoreError,
};
use crate::domain::data_type::{DataTypeIdentifier, TypeRegistry, TypeToken};
use crate::domain::sample::Sample;
use crate::domain::statistics::StatisticsCollection;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

pub(crate) fn token(data_type: DataTypeIdentifier) -> TypeToken {
    TypeToken::new(format!("stub.{}", data_type.key()))
}

pub(crate) fn registry() -> TypeRegistry {
    let configured: HashMap<DataTypeIdentifier, String> = DataTypeIdentifier::ALL
        .into_iter()
        .map(|id| (id, token(id).as_str().to_string()))
        .collect();
    TypeRegistry::resolve(&configured, |raw| Some(TypeToken::new(raw))).unwrap()
}

/// Returns whatever it was told to and records every request
pub(crate) struct StubStore {
    pub sample_response: Mutex<Result<Option<Vec<Sample>>, StoreError>>,
    pub statistics_response: Mutex<Result<Option<StatisticsCollection>, StoreError>>,
    pub authorization_response: Mutex<Result<(), StoreError>>,
    pub status: Mutex<AuthorizationStatus>,
    pub sample_queries: Mutex<Vec<SampleQuery>>,
    pub statistics_queries: Mutex<Vec<StatisticsCollectionQuery>>,
    pub authorization_requests: Mutex<Vec<(HashSet<TypeToken>, HashSet<TypeToken>)>>,
}

impl StubStore {
    pub fn new() -> Self {
        Self {
            sample_response: Mutex::new(Ok(Some(Vec::new()))),
            statistics_response: Mutex::new(Ok(None)),
            authorization_response: Mutex::new(Ok(())),
            status: Mutex::new(AuthorizationStatus::NotDetermined),
            sample_queries: Mutex::new(Vec::new()),
            statistics_queries: Mutex::new(Vec::new()),
            authorization_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_samples(self, response: Result<Option<Vec<Sample>>, StoreError>) -> Self {
        *self.sample_response.lock().unwrap() = response;
        self
    }

    pub fn with_statistics(
        self,
        response: Result<Option<StatisticsCollection>, StoreError>,
    ) -> Self {
        *self.statistics_response.lock().unwrap() = response;
        self
    }

    pub fn with_authorization(self, response: Result<(), StoreError>) -> Self {
        *self.authorization_response.lock().unwrap() = response;
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl HealthStore for StubStore {
    fn resolve_type_token(&self, raw: &str) -> Option<TypeToken> {
        Some(TypeToken::new(raw))
    }

    async fn request_authorization(
        &self,
        read: &HashSet<TypeToken>,
        write: &HashSet<TypeToken>,
    ) -> Result<(), StoreError> {
        self.authorization_requests
            .lock()
            .unwrap()
            .push((read.clone(), write.clone()));
        self.authorization_response.lock().unwrap().clone()
    }

    async fn authorization_status(&self, _token: &TypeToken) -> AuthorizationStatus {
        *self.status.lock().unwrap()
    }

    async fn execute_sample_query(
        &self,
        query: SampleQuery,
    ) -> Result<Option<Vec<Sample>>, StoreError> {
        self.sample_queries.lock().unwrap().push(query);
        self.sample_response.lock().unwrap().clone()
    }

    async fn execute_statistics_query(
        &self,
        query: StatisticsCollectionQuery,
    ) -> Result<Option<StatisticsCollection>, StoreError> {
        self.statistics_queries.lock().unwrap().push(query);
        self.statistics_response.lock().unwrap().clone()
    }
}

/// Counts WARN and ERROR events emitted while installed
#[derive(Clone, Default)]
pub(crate) struct WarningCounter {
    count: Arc<AtomicUsize>,
}

impl WarningCounter {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for WarningCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() <= Level::WARN {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Install a thread-local subscriber that counts warnings.
/// Tests must run on a current-thread runtime for spawned tasks to be seen.
pub(crate) fn capture_warnings() -> (WarningCounter, tracing::subscriber::DefaultGuard) {
    let counter = WarningCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (counter, guard)
}
