// Main entry point - Dependency injection and a one-shot health summary
use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Local, Utc};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use health_telemetry::domain::data_type::DataTypeIdentifier;
use health_telemetry::domain::quantity::Unit;
use health_telemetry::domain::sample::Sample;
use health_telemetry::domain::time_range::{add_days, day_range, start_of_day};
use health_telemetry::infrastructure::config::load_health_config;
use health_telemetry::infrastructure::fixture::{fixture_samples, load_fixture};
use health_telemetry::infrastructure::memory_store::InMemoryHealthStore;
use health_telemetry::{HealthClient, QueryOutcome};

const STEP_HISTORY_DAYS: i64 = 7;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_health_config()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Create store (infrastructure layer)
    let store = Arc::new(InMemoryHealthStore::new(config.store.prompt));
    if let Some(path) = &config.store.fixture {
        let fixture = load_fixture(path)?;
        store.insert_samples(fixture_samples(&fixture, Local::now())?).await;
    }

    // Create client (application layer); an unresolvable type table stops here
    let client =
        HealthClient::connect(store.clone(), &config.types.configured(), Handle::current())?;

    let readable: HashSet<DataTypeIdentifier> = DataTypeIdentifier::ALL.into_iter().collect();
    let writable = HashSet::from([DataTypeIdentifier::Workout]);
    client
        .request_authorization(Some(readable), Some(writable))
        .await?;
    tracing::info!(
        workout_sharing = ?client.authorization_status(DataTypeIdentifier::Workout).await,
        "Authorization flow finished"
    );

    let today = day_range(&Local::now());
    let (heart_rate, resting, variability, workouts) = futures::join!(
        client.heart_rate_samples(today.from, today.to),
        client.resting_heart_rate_samples(today.from, today.to),
        client.heart_rate_variability_samples(today.from, today.to),
        client.workouts(
            add_days(&start_of_day(&Local::now()), -STEP_HISTORY_DAYS)
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or(today.from),
            today.to,
        ),
    );

    report("heart rate", &heart_rate, Unit::CountPerMinute);
    report("resting heart rate", &resting, Unit::CountPerMinute);
    report("heart rate variability", &variability, Unit::Millisecond);

    if let QueryOutcome::Success(workouts) = &workouts {
        for sample in workouts {
            if let Some(workout) = sample.as_workout() {
                tracing::info!(
                    activity = workout.activity.name(),
                    start = %sample.start().with_timezone(&Local),
                    minutes = workout.duration.num_minutes(),
                    energy = ?workout.total_energy.map(|q| q.to_string()),
                    "Workout"
                );
            }
        }
    }

    // Daily steps through the handler API, bridged back with a oneshot
    let (tx, rx) = oneshot::channel();
    let _delivery = client.daily_step_totals_then(move |collection| {
        let _ = tx.send(collection);
    });

    match rx.await {
        Ok(collection) => {
            let now = Utc::now();
            let from = add_days(&collection.anchor(), 1 - STEP_HISTORY_DAYS)
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or(now);
            for stats in collection.enumerate(from, now) {
                let steps = stats.sum().map(|q| q.value()).unwrap_or(0.0);
                tracing::info!(
                    day = %stats.start().with_timezone(&Local).date_naive(),
                    steps,
                    "Daily steps"
                );
            }
        }
        Err(_) => tracing::warn!("No step totals delivered"),
    }

    Ok(())
}

fn report(label: &str, outcome: &QueryOutcome<Vec<Sample>>, unit: Unit) {
    match outcome {
        QueryOutcome::Success(samples) => {
            let values: Vec<f64> = samples
                .iter()
                .filter_map(|s| s.value_in(unit).ok())
                .collect();
            let average = (!values.is_empty())
                .then(|| values.iter().sum::<f64>() / values.len() as f64);
            tracing::info!(
                metric = label,
                count = values.len(),
                average = ?average,
                unit = %unit,
                "Today's samples"
            );
        }
        QueryOutcome::Unauthorized => tracing::info!(metric = label, "Not authorized"),
        QueryOutcome::TransportFailure(reason) => {
            tracing::info!(metric = label, %reason, "Query failed")
        }
    }
}
