// Sample domain models
use super::data_type::{SampleKind, TypeToken};
use super::quantity::{Quantity, Unit, UnitError};
use chrono::{DateTime, TimeDelta, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkoutActivity {
    Running,
    Walking,
    Cycling,
    Swimming,
    Hiking,
    StrengthTraining,
    Yoga,
    Other,
}

impl WorkoutActivity {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "running" => WorkoutActivity::Running,
            "walking" => WorkoutActivity::Walking,
            "cycling" => WorkoutActivity::Cycling,
            "swimming" => WorkoutActivity::Swimming,
            "hiking" => WorkoutActivity::Hiking,
            "strength_training" => WorkoutActivity::StrengthTraining,
            "yoga" => WorkoutActivity::Yoga,
            _ => WorkoutActivity::Other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WorkoutActivity::Running => "running",
            WorkoutActivity::Walking => "walking",
            WorkoutActivity::Cycling => "cycling",
            WorkoutActivity::Swimming => "swimming",
            WorkoutActivity::Hiking => "hiking",
            WorkoutActivity::StrengthTraining => "strength_training",
            WorkoutActivity::Yoga => "yoga",
            WorkoutActivity::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub activity: WorkoutActivity,
    pub duration: TimeDelta,
    pub total_energy: Option<Quantity>,
    pub total_distance: Option<Quantity>,
}

impl Workout {
    pub fn new(activity: WorkoutActivity, duration: TimeDelta) -> Self {
        Self {
            activity,
            duration,
            total_energy: None,
            total_distance: None,
        }
    }

    pub fn with_energy(mut self, energy: Quantity) -> Self {
        self.total_energy = Some(energy);
        self
    }

    pub fn with_distance(mut self, distance: Quantity) -> Self {
        self.total_distance = Some(distance);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Quantity(Quantity),
    Workout(Workout),
}

impl SampleValue {
    pub fn kind(&self) -> SampleKind {
        match self {
            SampleValue::Quantity(_) => SampleKind::Quantity,
            SampleValue::Workout(_) => SampleKind::Workout,
        }
    }
}

/// A single measurement as produced by a store. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    type_token: TypeToken,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    value: SampleValue,
}

impl Sample {
    pub fn quantity(
        type_token: TypeToken,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        quantity: Quantity,
    ) -> Self {
        Self {
            type_token,
            start,
            end,
            value: SampleValue::Quantity(quantity),
        }
    }

    pub fn workout(
        type_token: TypeToken,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        workout: Workout,
    ) -> Self {
        Self {
            type_token,
            start,
            end,
            value: SampleValue::Workout(workout),
        }
    }

    pub fn type_token(&self) -> &TypeToken {
        &self.type_token
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn value(&self) -> &SampleValue {
        &self.value
    }

    pub fn kind(&self) -> SampleKind {
        self.value.kind()
    }

    pub fn as_quantity(&self) -> Option<&Quantity> {
        match &self.value {
            SampleValue::Quantity(quantity) => Some(quantity),
            SampleValue::Workout(_) => None,
        }
    }

    pub fn as_workout(&self) -> Option<&Workout> {
        match &self.value {
            SampleValue::Workout(workout) => Some(workout),
            SampleValue::Quantity(_) => None,
        }
    }

    /// Express the sample's quantity in `unit`, e.g. beats per minute
    pub fn value_in(&self, unit: Unit) -> Result<f64, UnitError> {
        self.as_quantity()
            .ok_or(UnitError::NotAQuantity)?
            .value_in(unit)
    }
}
