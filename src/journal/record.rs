//! The journal record and its four date-keyed series.
//!
//! Dates are stored as [`NaiveDate`] and serialized as `YYYY-MM-DD`, so the
//! ordered maps iterate chronologically and the JSON form matches the
//! export file format.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Morning and afternoon temperature readings for one day, in °C.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub morning: Option<f64>,
    pub afternoon: Option<f64>,
}

impl TemperatureReading {
    pub fn new(morning: Option<f64>, afternoon: Option<f64>) -> Self {
        Self { morning, afternoon }
    }

    /// True when neither reading is present.
    pub fn is_empty(&self) -> bool {
        self.morning.is_none() && self.afternoon.is_none()
    }
}

/// One of the four independently keyed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Series {
    Rainfall,
    Temperature,
    Comments,
    Watts,
}

impl Series {
    pub fn all() -> &'static [Series] {
        &[
            Series::Rainfall,
            Series::Temperature,
            Series::Comments,
            Series::Watts,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Series::Rainfall => "rainfall",
            Series::Temperature => "temperature",
            Series::Comments => "comments",
            Series::Watts => "watts",
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The series that hold a single number per day and can be summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericSeries {
    Rainfall,
    Watts,
}

impl From<NumericSeries> for Series {
    fn from(series: NumericSeries) -> Self {
        match series {
            NumericSeries::Rainfall => Series::Rainfall,
            NumericSeries::Watts => Series::Watts,
        }
    }
}

/// An entry that breaks the record invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {series} entry for {date}: {reason}")]
pub struct InvalidEntry {
    pub series: Series,
    pub date: NaiveDate,
    pub reason: String,
}

/// The single persisted aggregate: four date-keyed series.
///
/// Series missing from the JSON form, or set to `null`, deserialize as
/// empty maps, and unknown top-level keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherRecord {
    /// Rainfall in millimetres.
    #[serde(deserialize_with = "nullable_series")]
    pub rainfall: BTreeMap<NaiveDate, f64>,
    /// A `null` day reads as an empty reading.
    #[serde(deserialize_with = "nullable_temperatures")]
    pub temperature: BTreeMap<NaiveDate, TemperatureReading>,
    /// Free text; blank comments are never stored.
    #[serde(deserialize_with = "nullable_series")]
    pub comments: BTreeMap<NaiveDate, String>,
    /// Power readings in watts.
    #[serde(deserialize_with = "nullable_series")]
    pub watts: BTreeMap<NaiveDate, f64>,
}

/// A series that may be `null` as a whole; `null` days are skipped.
fn nullable_series<'de, D, V>(deserializer: D) -> Result<BTreeMap<NaiveDate, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    let series: Option<BTreeMap<NaiveDate, Option<V>>> = Option::deserialize(deserializer)?;
    Ok(series
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(date, value)| value.map(|v| (date, v)))
        .collect())
}

fn nullable_temperatures<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<NaiveDate, TemperatureReading>, D::Error>
where
    D: Deserializer<'de>,
{
    let series: Option<BTreeMap<NaiveDate, Option<TemperatureReading>>> =
        Option::deserialize(deserializer)?;
    Ok(series
        .unwrap_or_default()
        .into_iter()
        .map(|(date, reading)| (date, reading.unwrap_or_default()))
        .collect())
}

impl WeatherRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// The map backing a numeric series.
    pub fn numeric(&self, series: NumericSeries) -> &BTreeMap<NaiveDate, f64> {
        match series {
            NumericSeries::Rainfall => &self.rainfall,
            NumericSeries::Watts => &self.watts,
        }
    }

    pub(crate) fn numeric_mut(&mut self, series: NumericSeries) -> &mut BTreeMap<NaiveDate, f64> {
        match series {
            NumericSeries::Rainfall => &mut self.rainfall,
            NumericSeries::Watts => &mut self.watts,
        }
    }

    /// Dates present in a series, ascending.
    pub fn dates(&self, series: Series) -> Vec<NaiveDate> {
        match series {
            Series::Rainfall => self.rainfall.keys().copied().collect(),
            Series::Temperature => self.temperature.keys().copied().collect(),
            Series::Comments => self.comments.keys().copied().collect(),
            Series::Watts => self.watts.keys().copied().collect(),
        }
    }

    /// Number of entries in a series.
    pub fn len(&self, series: Series) -> usize {
        match series {
            Series::Rainfall => self.rainfall.len(),
            Series::Temperature => self.temperature.len(),
            Series::Comments => self.comments.len(),
            Series::Watts => self.watts.len(),
        }
    }

    /// Total number of entries across all series.
    pub fn entry_count(&self) -> usize {
        Series::all().iter().map(|s| self.len(*s)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Merges `other` into `self`, series by series. Entries of `other` win
    /// on key collision.
    ///
    /// A blank comment or an empty temperature in `other` clears the
    /// corresponding entry instead of being stored. Returns the number of
    /// entries taken from `other`.
    pub fn merge_from(&mut self, other: WeatherRecord) -> usize {
        let count = other.entry_count();

        self.rainfall.extend(other.rainfall);
        self.watts.extend(other.watts);

        for (date, reading) in other.temperature {
            if reading.is_empty() {
                self.temperature.remove(&date);
            } else {
                self.temperature.insert(date, reading);
            }
        }

        for (date, comment) in other.comments {
            if comment.trim().is_empty() {
                self.comments.remove(&date);
            } else {
                self.comments.insert(date, comment);
            }
        }

        count
    }

    /// Checks the value invariants: numeric readings are finite and
    /// rainfall/watts are non-negative.
    pub fn validate(&self) -> Result<(), InvalidEntry> {
        for series in [NumericSeries::Rainfall, NumericSeries::Watts] {
            for (date, value) in self.numeric(series) {
                check_amount(series, *date, *value)?;
            }
        }

        for (date, reading) in &self.temperature {
            check_temperature(*date, reading)?;
        }

        Ok(())
    }
}

/// Rainfall and watts must be finite and non-negative.
pub(crate) fn check_amount(
    series: NumericSeries,
    date: NaiveDate,
    value: f64,
) -> Result<(), InvalidEntry> {
    if !value.is_finite() || value < 0.0 {
        return Err(InvalidEntry {
            series: series.into(),
            date,
            reason: format!("expected a non-negative number, got {}", value),
        });
    }
    Ok(())
}

pub(crate) fn check_temperature(
    date: NaiveDate,
    reading: &TemperatureReading,
) -> Result<(), InvalidEntry> {
    for value in [reading.morning, reading.afternoon].into_iter().flatten() {
        if !value.is_finite() {
            return Err(InvalidEntry {
                series: Series::Temperature,
                date,
                reason: format!("expected a finite temperature, got {}", value),
            });
        }
    }
    Ok(())
}
