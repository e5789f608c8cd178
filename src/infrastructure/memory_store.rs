// In-memory health store implementation
use crate::application::health_store::{
    AuthorizationStatus, HealthStore, SampleQuery, SortDescriptor, StatisticsCollectionQuery,
    StoreError,
};
use crate::domain::data_type::{AggregationStyle, DataTypeIdentifier, TypeToken};
use crate::domain::sample::Sample;
use crate::domain::statistics::{StatisticsCollection, StatisticsOptions};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Native token names this store understands out of the box
pub const DEFAULT_TYPE_TOKENS: [(DataTypeIdentifier, &str); 5] = [
    (DataTypeIdentifier::HeartRate, "quantity.heart_rate"),
    (DataTypeIdentifier::RestingHeartRate, "quantity.resting_heart_rate"),
    (
        DataTypeIdentifier::HeartRateVariability,
        "quantity.heart_rate_variability_sdnn",
    ),
    (DataTypeIdentifier::StepCount, "quantity.step_count"),
    (DataTypeIdentifier::Workout, "workout"),
];

/// How the simulated user answers a permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptResponse {
    #[default]
    Grant,
    Deny,
}

#[derive(Debug, Default)]
struct StoreState {
    samples: Vec<Sample>,
    read_decisions: HashMap<TypeToken, bool>,
    share_decisions: HashMap<TypeToken, bool>,
    prompts_shown: usize,
}

/// A process-local store that behaves like the platform store for one user.
///
/// Each type is decided once, on the first prompt that includes it; later
/// requests for decided types do not prompt again.
#[derive(Debug)]
pub struct InMemoryHealthStore {
    vocabulary: HashMap<String, DataTypeIdentifier>,
    prompt: PromptResponse,
    available: AtomicBool,
    state: RwLock<StoreState>,
}

impl InMemoryHealthStore {
    pub fn new(prompt: PromptResponse) -> Self {
        Self::with_vocabulary(
            prompt,
            DEFAULT_TYPE_TOKENS
                .into_iter()
                .map(|(identifier, raw)| (raw.to_string(), identifier)),
        )
    }

    pub fn with_vocabulary<I>(prompt: PromptResponse, vocabulary: I) -> Self
    where
        I: IntoIterator<Item = (String, DataTypeIdentifier)>,
    {
        Self {
            vocabulary: vocabulary.into_iter().collect(),
            prompt,
            available: AtomicBool::new(true),
            state: RwLock::new(StoreState::default()),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn insert_samples<I>(&self, samples: I)
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut state = self.state.write().await;
        let before = state.samples.len();
        state.samples.extend(samples);
        tracing::debug!(added = state.samples.len() - before, "Stored health samples");
    }

    /// Number of times a permission prompt was shown
    pub async fn prompts_shown(&self) -> usize {
        self.state.read().await.prompts_shown
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }

    fn identifier(&self, token: &TypeToken) -> Result<DataTypeIdentifier, StoreError> {
        self.vocabulary
            .get(token.as_str())
            .copied()
            .ok_or_else(|| StoreError::InvalidArgument(format!("unknown type token '{}'", token)))
    }

    fn check_read_access(state: &StoreState, token: &TypeToken) -> Result<(), StoreError> {
        match state.read_decisions.get(token) {
            Some(true) => Ok(()),
            Some(false) => Err(StoreError::AuthorizationDenied),
            None => Err(StoreError::AuthorizationNotDetermined),
        }
    }
}

#[async_trait]
impl HealthStore for InMemoryHealthStore {
    fn resolve_type_token(&self, raw: &str) -> Option<TypeToken> {
        self.vocabulary
            .contains_key(raw)
            .then(|| TypeToken::new(raw))
    }

    async fn request_authorization(
        &self,
        read: &HashSet<TypeToken>,
        write: &HashSet<TypeToken>,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        if read.is_empty() && write.is_empty() {
            return Err(StoreError::InvalidArgument(
                "authorization requires at least one type".to_string(),
            ));
        }
        for token in read.iter().chain(write) {
            self.identifier(token)?;
        }

        let granted = self.prompt == PromptResponse::Grant;
        let mut state = self.state.write().await;
        let undecided = read
            .iter()
            .any(|token| !state.read_decisions.contains_key(token))
            || write
                .iter()
                .any(|token| !state.share_decisions.contains_key(token));

        if undecided {
            state.prompts_shown += 1;
            for token in read {
                state.read_decisions.entry(token.clone()).or_insert(granted);
            }
            for token in write {
                state.share_decisions.entry(token.clone()).or_insert(granted);
            }
            tracing::info!(granted, "Health data permission prompt answered");
        }

        Ok(())
    }

    async fn authorization_status(&self, token: &TypeToken) -> AuthorizationStatus {
        match self.state.read().await.share_decisions.get(token) {
            Some(true) => AuthorizationStatus::SharingAuthorized,
            Some(false) => AuthorizationStatus::SharingDenied,
            None => AuthorizationStatus::NotDetermined,
        }
    }

    async fn execute_sample_query(
        &self,
        query: SampleQuery,
    ) -> Result<Option<Vec<Sample>>, StoreError> {
        self.check_available()?;
        self.identifier(&query.type_token)?;

        let state = self.state.read().await;
        Self::check_read_access(&state, &query.type_token)?;

        let mut samples: Vec<Sample> = state
            .samples
            .iter()
            .filter(|s| s.type_token() == &query.type_token && query.predicate.matches(s))
            .cloned()
            .collect();

        if let Some(SortDescriptor::StartDateDescending) = query.sort {
            samples.sort_by(|a, b| b.start().cmp(&a.start()));
        }
        if let Some(limit) = query.limit {
            samples.truncate(limit);
        }

        Ok(Some(samples))
    }

    async fn execute_statistics_query(
        &self,
        query: StatisticsCollectionQuery,
    ) -> Result<Option<StatisticsCollection>, StoreError> {
        self.check_available()?;
        let identifier = self.identifier(&query.type_token)?;

        let unit = match (identifier.aggregation_style(), query.options) {
            (Some(AggregationStyle::Cumulative), StatisticsOptions::CumulativeSum) => {
                identifier.canonical_unit()
            }
            _ => None,
        }
        .ok_or_else(|| {
            StoreError::InvalidArgument(format!("{} does not support cumulative sums", identifier))
        })?;

        let state = self.state.read().await;
        Self::check_read_access(&state, &query.type_token)?;

        let matching = state.samples.iter().filter(|s| {
            s.type_token() == &query.type_token
                && query.predicate.is_none_or(|predicate| predicate.matches(s))
        });

        StatisticsCollection::from_samples(query.anchor, query.interval_days, unit, matching)
            .map(Some)
            .map_err(|e| StoreError::Transport(e.to_string()))
    }
}
