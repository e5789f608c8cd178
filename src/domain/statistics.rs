// Interval statistics over cumulative samples
use super::quantity::{Quantity, Unit, UnitError};
use super::sample::Sample;
use super::time_range::{add_days, start_of_day};
use chrono::{DateTime, Local, Utc};
use std::collections::BTreeMap;

/// Aggregations a statistics query can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticsOptions {
    CumulativeSum,
}

/// One bucket of a collection. `sum` is absent when no sample fell into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    sum: Option<Quantity>,
}

impl Statistics {
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn sum(&self) -> Option<Quantity> {
        self.sum
    }
}

/// Running sums over fixed calendar-day buckets.
///
/// Buckets are laid out from `anchor` (a local midnight) in steps of
/// `interval_days`, both forwards and backwards, so any instant maps to exactly
/// one bucket. Callers pick the sub-range they care about with [`enumerate`].
///
/// [`enumerate`]: StatisticsCollection::enumerate
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsCollection {
    anchor: DateTime<Local>,
    interval_days: u32,
    unit: Unit,
    sums: BTreeMap<DateTime<Utc>, f64>,
}

impl StatisticsCollection {
    pub fn new(anchor: DateTime<Local>, interval_days: u32, unit: Unit) -> Self {
        Self {
            anchor,
            interval_days: interval_days.max(1),
            unit,
            sums: BTreeMap::new(),
        }
    }

    /// Sum every quantity sample into the bucket containing its start
    pub fn from_samples<'a, I>(
        anchor: DateTime<Local>,
        interval_days: u32,
        unit: Unit,
        samples: I,
    ) -> Result<Self, UnitError>
    where
        I: IntoIterator<Item = &'a Sample>,
    {
        let mut collection = Self::new(anchor, interval_days, unit);
        for sample in samples {
            let quantity = sample.as_quantity().ok_or(UnitError::NotAQuantity)?;
            collection.add(sample.start(), *quantity)?;
        }
        Ok(collection)
    }

    pub fn add(&mut self, at: DateTime<Utc>, quantity: Quantity) -> Result<(), UnitError> {
        let value = quantity.value_in(self.unit)?;
        if let Some(start) = self.bucket_start(at) {
            *self.sums.entry(start.with_timezone(&Utc)).or_insert(0.0) += value;
        }
        Ok(())
    }

    pub fn anchor(&self) -> DateTime<Local> {
        self.anchor
    }

    pub fn interval_days(&self) -> u32 {
        self.interval_days
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Bucket containing `instant`, whether or not it holds data
    pub fn statistics_for(&self, instant: DateTime<Utc>) -> Option<Statistics> {
        self.bucket_start(instant)
            .and_then(|start| self.bucket(start))
    }

    /// Every bucket from the one containing `from` up to the one containing
    /// `to`, in ascending order. Empty buckets are included with no sum.
    pub fn enumerate(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Iterator<Item = Statistics> + '_ {
        let first = if from <= to {
            self.bucket_start(from)
        } else {
            None
        };
        let step = i64::from(self.interval_days);

        std::iter::successors(first, move |start| add_days(start, step))
            .enumerate()
            .take_while(move |(index, start)| *index == 0 || start.with_timezone(&Utc) < to)
            .filter_map(move |(_, start)| self.bucket(start))
    }

    /// Buckets that received at least one sample, ascending
    pub fn statistics(&self) -> Vec<Statistics> {
        self.sums
            .keys()
            .filter_map(|start| self.bucket(start.with_timezone(&Local)))
            .collect()
    }

    fn bucket_start(&self, instant: DateTime<Utc>) -> Option<DateTime<Local>> {
        let day = start_of_day(&instant.with_timezone(&Local));
        let offset_days = (day.date_naive() - self.anchor.date_naive()).num_days();
        let step = i64::from(self.interval_days);
        add_days(&self.anchor, offset_days.div_euclid(step) * step)
    }

    fn bucket(&self, start: DateTime<Local>) -> Option<Statistics> {
        let end = add_days(&start, i64::from(self.interval_days))?;
        let start = start.with_timezone(&Utc);
        Some(Statistics {
            start,
            end: end.with_timezone(&Utc),
            sum: self
                .sums
                .get(&start)
                .map(|value| Quantity::new(*value, self.unit)),
        })
    }
}
