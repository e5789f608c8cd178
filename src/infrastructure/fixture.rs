// Fixture loading - Seeds a store with samples relative to today
use crate::domain::data_type::TypeToken;
use crate::domain::quantity::{Quantity, Unit};
use crate::domain::sample::{Sample, Workout, WorkoutActivity};
use crate::domain::time_range::{add_days, at_time_of_day, start_of_day};
use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveTime, TimeDelta, Utc};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub samples: Vec<FixtureSample>,
}

/// One sample, placed on a day relative to today (`day = -1` is yesterday)
#[derive(Debug, Deserialize)]
pub struct FixtureSample {
    #[serde(rename = "type")]
    pub type_token: String,
    #[serde(default)]
    pub day: i64,
    /// Local wall-clock start, `HH:MM`
    pub start: String,
    #[serde(default)]
    pub minutes: i64,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub activity: Option<String>,
    pub energy_kcal: Option<f64>,
    pub distance_km: Option<f64>,
}

pub fn load_fixture(path: impl AsRef<Path>) -> Result<Fixture> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture {}", path.display()))?;
    parse_fixture(&raw).with_context(|| format!("Failed to parse fixture {}", path.display()))
}

pub fn parse_fixture(raw: &str) -> Result<Fixture> {
    Ok(serde_json::from_str(raw)?)
}

/// Materialize fixture entries as samples. Entries with an `activity` become
/// workouts, everything else must carry a value and unit.
pub fn fixture_samples(fixture: &Fixture, now: DateTime<Local>) -> Result<Vec<Sample>> {
    let today = start_of_day(&now);
    fixture
        .samples
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            to_sample(entry, &today).with_context(|| format!("Invalid fixture sample #{}", index))
        })
        .collect()
}

fn to_sample(entry: &FixtureSample, today: &DateTime<Local>) -> Result<Sample> {
    let day = add_days(today, entry.day).context("day offset out of range")?;
    let time = NaiveTime::parse_from_str(&entry.start, "%H:%M")
        .with_context(|| format!("bad start time '{}'", entry.start))?;
    let start = at_time_of_day(&day, time)
        .context("start time does not exist on that day")?
        .with_timezone(&Utc);
    let duration = TimeDelta::minutes(entry.minutes.max(0));
    let end = start + duration;
    let token = TypeToken::new(entry.type_token.clone());

    if let Some(activity) = &entry.activity {
        let mut workout = Workout::new(WorkoutActivity::from_name(activity), duration);
        if let Some(kcal) = entry.energy_kcal {
            workout = workout.with_energy(Quantity::new(kcal, Unit::Kilocalorie));
        }
        if let Some(km) = entry.distance_km {
            workout = workout.with_distance(Quantity::new(km, Unit::Kilometer));
        }
        return Ok(Sample::workout(token, start, end, workout));
    }

    let value = entry.value.context("quantity sample without value")?;
    let symbol = entry.unit.as_deref().context("quantity sample without unit")?;
    let unit = Unit::from_symbol(symbol).with_context(|| format!("unknown unit '{}'", symbol))?;
    Ok(Sample::quantity(token, start, end, Quantity::new(value, unit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::data_type::SampleKind;
    use chrono::TimeZone;

    const FIXTURE: &str = r#"{
        "samples": [
            { "type": "quantity.heart_rate", "start": "07:30", "value": 61, "unit": "bpm" },
            { "type": "quantity.step_count", "day": -1, "start": "12:00", "minutes": 20, "value": 2400, "unit": "count" },
            { "type": "workout", "day": -2, "start": "18:15", "minutes": 45, "activity": "running", "energy_kcal": 480, "distance_km": 8.2 }
        ]
    }"#;

    #[test]
    fn test_fixture_samples_relative_to_today() {
        let now = Local.with_ymd_and_hms(2025, 1, 14, 20, 0, 0).unwrap();
        let samples = fixture_samples(&parse_fixture(FIXTURE).unwrap(), now).unwrap();
        assert_eq!(samples.len(), 3);

        let heart = &samples[0];
        assert_eq!(
            heart.start(),
            Local.with_ymd_and_hms(2025, 1, 14, 7, 30, 0).unwrap().with_timezone(&Utc)
        );
        assert_eq!(heart.start(), heart.end());
        assert_eq!(heart.value_in(Unit::CountPerMinute).unwrap(), 61.0);

        let steps = &samples[1];
        assert_eq!(
            steps.start(),
            Local.with_ymd_and_hms(2025, 1, 13, 12, 0, 0).unwrap().with_timezone(&Utc)
        );
        assert_eq!(steps.end() - steps.start(), TimeDelta::minutes(20));

        let run = samples[2].as_workout().unwrap();
        assert_eq!(samples[2].kind(), SampleKind::Workout);
        assert_eq!(run.activity, WorkoutActivity::Running);
        assert_eq!(run.total_distance, Some(Quantity::new(8.2, Unit::Kilometer)));
    }

    #[test]
    fn test_start_keeps_wall_clock_across_dst_change() {
        // March 9 and March 30 2025 are DST change days in North America and Europe
        let fixture = parse_fixture(
            r#"{ "samples": [
                { "type": "quantity.step_count", "day": -22, "start": "12:00", "value": 900, "unit": "count" },
                { "type": "quantity.step_count", "day": -1, "start": "12:00", "value": 700, "unit": "count" }
            ] }"#,
        )
        .unwrap();
        let now = Local.with_ymd_and_hms(2025, 3, 31, 20, 0, 0).unwrap();

        let samples = fixture_samples(&fixture, now).unwrap();
        let local_starts: Vec<_> = samples
            .iter()
            .map(|s| s.start().with_timezone(&Local).naive_local())
            .collect();
        assert_eq!(
            local_starts,
            vec![
                Local.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap().naive_local(),
                Local.with_ymd_and_hms(2025, 3, 30, 12, 0, 0).unwrap().naive_local(),
            ]
        );
    }

    #[test]
    fn test_rejects_quantity_without_unit() {
        let fixture = parse_fixture(
            r#"{ "samples": [ { "type": "quantity.heart_rate", "start": "07:30", "value": 61 } ] }"#,
        )
        .unwrap();
        let now = Local.with_ymd_and_hms(2025, 1, 14, 20, 0, 0).unwrap();

        let err = fixture_samples(&fixture, now).unwrap_err();
        assert!(format!("{:#}", err).contains("without unit"));
    }
}
