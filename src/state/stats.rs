//! Summary figures for the top bar.

use crate::journal::aggregate::{month_bounds, sum_for_period, year_bounds};
use crate::journal::{NumericSeries, WeatherRecord};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

/// Statistics displayed in the top bar.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct JournalStats {
    pub rainfall_today: f64,
    pub rainfall_month: f64,
    pub rainfall_year: f64,
    /// Days this year with measurable rain.
    pub rainy_days_year: usize,
    pub watts_month: f64,
    pub watts_year: f64,
    /// Distinct days with any entry.
    pub recorded_days: usize,
}

impl JournalStats {
    pub fn compute(record: &WeatherRecord, today: NaiveDate) -> Self {
        let (month_start, month_end) =
            month_bounds(today.year(), today.month()).unwrap_or((today, today));
        let (year_start, year_end) = year_bounds(today.year()).unwrap_or((today, today));

        let rainy_days_year = record
            .rainfall
            .range(year_start..=year_end)
            .filter(|(_, mm)| **mm > 0.0)
            .count();

        let recorded_days = record
            .rainfall
            .keys()
            .chain(record.temperature.keys())
            .chain(record.comments.keys())
            .chain(record.watts.keys())
            .collect::<BTreeSet<_>>()
            .len();

        Self {
            rainfall_today: record.rainfall.get(&today).copied().unwrap_or(0.0),
            rainfall_month: sum_for_period(record, NumericSeries::Rainfall, month_start, month_end),
            rainfall_year: sum_for_period(record, NumericSeries::Rainfall, year_start, year_end),
            rainy_days_year,
            watts_month: sum_for_period(record, NumericSeries::Watts, month_start, month_end),
            watts_year: sum_for_period(record, NumericSeries::Watts, year_start, year_end),
            recorded_days,
        }
    }

    /// Format rainfall stats for display (e.g., "today 2.5 mm · month 40.0 mm").
    pub fn format_rainfall(&self) -> String {
        format!(
            "today {:.1} mm · month {:.1} mm · year {:.1} mm ({} rainy days)",
            self.rainfall_today, self.rainfall_month, self.rainfall_year, self.rainy_days_year
        )
    }

    pub fn format_watts(&self) -> String {
        format!(
            "month {} · year {}",
            format_watts(self.watts_month),
            format_watts(self.watts_year)
        )
    }
}

/// Format a power figure into a human-readable string.
pub fn format_watts(watts: f64) -> String {
    const KW: f64 = 1000.0;
    const MW: f64 = KW * 1000.0;

    if watts >= MW {
        format!("{:.2} MW", watts / MW)
    } else if watts >= KW {
        format!("{:.1} kW", watts / KW)
    } else {
        format!("{:.0} W", watts)
    }
}
