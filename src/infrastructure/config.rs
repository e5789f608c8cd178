use crate::domain::data_type::DataTypeIdentifier;
use crate::infrastructure::memory_store::PromptResponse;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    pub types: TypeTokensConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Store-native token name per data type. Missing entries fail at startup.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TypeTokensConfig {
    pub heart_rate: Option<String>,
    pub resting_heart_rate: Option<String>,
    pub heart_rate_variability: Option<String>,
    pub step_count: Option<String>,
    pub workout: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreConfig {
    pub fixture: Option<String>,
    #[serde(default)]
    pub prompt: PromptResponse,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl TypeTokensConfig {
    pub fn configured(&self) -> HashMap<DataTypeIdentifier, String> {
        [
            (DataTypeIdentifier::HeartRate, &self.heart_rate),
            (DataTypeIdentifier::RestingHeartRate, &self.resting_heart_rate),
            (DataTypeIdentifier::HeartRateVariability, &self.heart_rate_variability),
            (DataTypeIdentifier::StepCount, &self.step_count),
            (DataTypeIdentifier::Workout, &self.workout),
        ]
        .into_iter()
        .filter_map(|(identifier, token)| token.clone().map(|token| (identifier, token)))
        .collect()
    }
}

pub fn load_health_config() -> anyhow::Result<HealthConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/health"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
