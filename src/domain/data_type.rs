// Health data type identifiers and the store token table
use crate::domain::quantity::Unit;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataTypeIdentifier {
    HeartRate,
    RestingHeartRate,
    HeartRateVariability,
    StepCount,
    Workout,
}

/// Shape of the samples a data type produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Quantity,
    Workout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationStyle {
    Discrete,
    Cumulative,
}

impl DataTypeIdentifier {
    pub const ALL: [DataTypeIdentifier; 5] = [
        DataTypeIdentifier::HeartRate,
        DataTypeIdentifier::RestingHeartRate,
        DataTypeIdentifier::HeartRateVariability,
        DataTypeIdentifier::StepCount,
        DataTypeIdentifier::Workout,
    ];

    /// Configuration key, e.g. `heart_rate`
    pub fn key(&self) -> &'static str {
        match self {
            DataTypeIdentifier::HeartRate => "heart_rate",
            DataTypeIdentifier::RestingHeartRate => "resting_heart_rate",
            DataTypeIdentifier::HeartRateVariability => "heart_rate_variability",
            DataTypeIdentifier::StepCount => "step_count",
            DataTypeIdentifier::Workout => "workout",
        }
    }

    pub fn sample_kind(&self) -> SampleKind {
        match self {
            DataTypeIdentifier::Workout => SampleKind::Workout,
            _ => SampleKind::Quantity,
        }
    }

    /// Workouts are not aggregated and have no style
    pub fn aggregation_style(&self) -> Option<AggregationStyle> {
        match self {
            DataTypeIdentifier::StepCount => Some(AggregationStyle::Cumulative),
            DataTypeIdentifier::Workout => None,
            _ => Some(AggregationStyle::Discrete),
        }
    }

    pub fn canonical_unit(&self) -> Option<Unit> {
        match self {
            DataTypeIdentifier::HeartRate | DataTypeIdentifier::RestingHeartRate => {
                Some(Unit::CountPerMinute)
            }
            DataTypeIdentifier::HeartRateVariability => Some(Unit::Millisecond),
            DataTypeIdentifier::StepCount => Some(Unit::Count),
            DataTypeIdentifier::Workout => None,
        }
    }

    /// Steps are only exposed through daily statistics
    pub fn supports_sample_queries(&self) -> bool {
        !matches!(self, DataTypeIdentifier::StepCount)
    }
}

impl fmt::Display for DataTypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Store-native identifier for a class of health data
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeToken(String);

impl TypeToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("no type token configured for {0}")]
    Missing(DataTypeIdentifier),
    #[error("store does not recognize type token '{token}' configured for {identifier}")]
    Unresolved {
        identifier: DataTypeIdentifier,
        token: String,
    },
}

/// Lookup table from identifier to store token.
///
/// Built once at startup; every identifier is guaranteed to have a token
/// afterwards, so lookups never fail.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    tokens: HashMap<DataTypeIdentifier, TypeToken>,
}

impl TypeRegistry {
    pub fn resolve<F>(
        configured: &HashMap<DataTypeIdentifier, String>,
        resolve: F,
    ) -> Result<Self, RegistryError>
    where
        F: Fn(&str) -> Option<TypeToken>,
    {
        let mut tokens = HashMap::with_capacity(DataTypeIdentifier::ALL.len());

        for identifier in DataTypeIdentifier::ALL {
            let raw = configured
                .get(&identifier)
                .ok_or(RegistryError::Missing(identifier))?;
            let token = resolve(raw).ok_or_else(|| RegistryError::Unresolved {
                identifier,
                token: raw.clone(),
            })?;
            tokens.insert(identifier, token);
        }

        Ok(Self { tokens })
    }

    pub fn token(&self, identifier: DataTypeIdentifier) -> &TypeToken {
        &self.tokens[&identifier]
    }

    pub fn tokens<I>(&self, identifiers: I) -> HashSet<TypeToken>
    where
        I: IntoIterator<Item = DataTypeIdentifier>,
    {
        identifiers
            .into_iter()
            .map(|identifier| self.token(identifier).clone())
            .collect()
    }

    pub fn identifier(&self, token: &TypeToken) -> Option<DataTypeIdentifier> {
        self.tokens
            .iter()
            .find(|(_, candidate)| *candidate == token)
            .map(|(identifier, _)| *identifier)
    }
}
