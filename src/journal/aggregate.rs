//! Period queries and chart series over the journal record.
//!
//! Sums treat a missing day as zero. Averages exclude missing readings and
//! yield `None` for a period without any, so a chart never shows a
//! temperature that was not recorded.

use super::record::{NumericSeries, TemperatureReading, WeatherRecord};
use chrono::{Datelike, NaiveDate};

/// Mean morning and afternoon temperatures over a period.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TemperatureAverage {
    pub morning: Option<f64>,
    pub afternoon: Option<f64>,
}

/// Sums a numeric series over `[start, end]`, inclusive.
pub fn sum_for_period(
    record: &WeatherRecord,
    series: NumericSeries,
    start: NaiveDate,
    end: NaiveDate,
) -> f64 {
    if start > end {
        return 0.0;
    }
    record
        .numeric(series)
        .range(start..=end)
        .map(|(_, value)| value)
        .sum()
}

/// Averages morning and afternoon readings independently over `[start, end]`.
pub fn average_for_period(
    record: &WeatherRecord,
    start: NaiveDate,
    end: NaiveDate,
) -> TemperatureAverage {
    if start > end {
        return TemperatureAverage::default();
    }

    let readings: Vec<&TemperatureReading> = record
        .temperature
        .range(start..=end)
        .map(|(_, reading)| reading)
        .collect();

    TemperatureAverage {
        morning: mean(readings.iter().filter_map(|r| r.morning)),
        afternoon: mean(readings.iter().filter_map(|r| r.afternoon)),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// First and last day of a calendar year.
pub fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}

/// Temperature averages for each month of `year` (January first).
pub fn monthly_temperature_averages(
    record: &WeatherRecord,
    year: i32,
) -> [TemperatureAverage; 12] {
    let mut averages = [TemperatureAverage::default(); 12];
    for (index, average) in averages.iter_mut().enumerate() {
        if let Some((start, end)) = month_bounds(year, index as u32 + 1) {
            *average = average_for_period(record, start, end);
        }
    }
    averages
}

/// Totals of a numeric series for each month of `year` (January first).
pub fn monthly_totals(
    record: &WeatherRecord,
    series: NumericSeries,
    year: i32,
) -> [f64; 12] {
    let mut totals = [0.0; 12];
    for (index, total) in totals.iter_mut().enumerate() {
        if let Some((start, end)) = month_bounds(year, index as u32 + 1) {
            *total = sum_for_period(record, series, start, end);
        }
    }
    totals
}

/// One value per day of the month, `None` where nothing was recorded.
pub fn daily_values(
    record: &WeatherRecord,
    series: NumericSeries,
    year: i32,
    month: u32,
) -> Vec<Option<f64>> {
    days_of_month(year, month)
        .map(|day| record.numeric(series).get(&day).copied())
        .collect()
}

/// One reading per day of the month, empty where nothing was recorded.
pub fn daily_temperatures(
    record: &WeatherRecord,
    year: i32,
    month: u32,
) -> Vec<TemperatureReading> {
    days_of_month(year, month)
        .map(|day| record.temperature.get(&day).copied().unwrap_or_default())
        .collect()
}

fn days_of_month(year: i32, month: u32) -> impl Iterator<Item = NaiveDate> {
    month_bounds(year, month)
        .into_iter()
        .flat_map(|(start, end)| start.iter_days().take_while(move |d| *d <= end))
}

/// Number of days of the month, for chart labels.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    month_bounds(year, month)
        .map(|(_, end)| end.day())
        .unwrap_or(0)
}
