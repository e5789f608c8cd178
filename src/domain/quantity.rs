// Unit-bearing measurement values
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Count,
    CountPerSecond,
    CountPerMinute,
    Second,
    Millisecond,
    Minute,
    Kilocalorie,
    Kilojoule,
    Meter,
    Kilometer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Count,
    Frequency,
    Time,
    Energy,
    Length,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Count => "count",
            Unit::CountPerSecond => "count/s",
            Unit::CountPerMinute => "count/min",
            Unit::Second => "s",
            Unit::Millisecond => "ms",
            Unit::Minute => "min",
            Unit::Kilocalorie => "kcal",
            Unit::Kilojoule => "kJ",
            Unit::Meter => "m",
            Unit::Kilometer => "km",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Unit> {
        let unit = match symbol {
            "count" => Unit::Count,
            "count/s" => Unit::CountPerSecond,
            "count/min" | "bpm" => Unit::CountPerMinute,
            "s" => Unit::Second,
            "ms" => Unit::Millisecond,
            "min" => Unit::Minute,
            "kcal" => Unit::Kilocalorie,
            "kJ" => Unit::Kilojoule,
            "m" => Unit::Meter,
            "km" => Unit::Kilometer,
            _ => return None,
        };
        Some(unit)
    }

    fn dimension(&self) -> Dimension {
        match self {
            Unit::Count => Dimension::Count,
            Unit::CountPerSecond | Unit::CountPerMinute => Dimension::Frequency,
            Unit::Second | Unit::Millisecond | Unit::Minute => Dimension::Time,
            Unit::Kilocalorie | Unit::Kilojoule => Dimension::Energy,
            Unit::Meter | Unit::Kilometer => Dimension::Length,
        }
    }

    /// Factor to the base unit of the dimension (count, count/s, s, J, m)
    fn scale(&self) -> f64 {
        match self {
            Unit::Count | Unit::CountPerSecond | Unit::Second | Unit::Meter => 1.0,
            Unit::CountPerMinute => 1.0 / 60.0,
            Unit::Millisecond => 0.001,
            Unit::Minute => 60.0,
            Unit::Kilocalorie => 4184.0,
            Unit::Kilojoule => 1000.0,
            Unit::Kilometer => 1000.0,
        }
    }

    pub fn is_compatible_with(&self, other: Unit) -> bool {
        self.dimension() == other.dimension()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("cannot convert {from} to {to}")]
    Incompatible { from: Unit, to: Unit },
    #[error("sample does not carry a quantity")]
    NotAQuantity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    value: f64,
    unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn value_in(&self, unit: Unit) -> Result<f64, UnitError> {
        if !self.unit.is_compatible_with(unit) {
            return Err(UnitError::Incompatible {
                from: self.unit,
                to: unit,
            });
        }
        if self.unit == unit {
            return Ok(self.value);
        }
        Ok(self.value * self.unit.scale() / unit.scale())
    }

    pub fn convert(&self, unit: Unit) -> Result<Quantity, UnitError> {
        Ok(Quantity::new(self.value_in(unit)?, unit))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
