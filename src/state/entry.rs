//! Entry form for the selected day.

use crate::journal::{NumericSeries, TemperatureReading, WeatherRecord};
use chrono::NaiveDate;

/// A form field that could not be read as a number.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field}: \"{input}\" is not a number")]
pub struct FieldError {
    pub field: &'static str,
    pub input: String,
}

/// Text buffers behind the entry form.
///
/// Buffers are refilled from the journal whenever the selected date changes
/// or the record is replaced (open, import).
#[derive(Debug, Clone, Default)]
pub struct EntryForm {
    pub rainfall: String,
    pub morning: String,
    pub afternoon: String,
    pub comment: String,
    pub watts: String,
    /// Text of the date field, applied when it parses.
    pub date_input: String,
}

impl EntryForm {
    /// Fills every buffer from the record's values for `date`.
    pub fn fill(&mut self, record: &WeatherRecord, date: NaiveDate) {
        let amount = |series: NumericSeries| {
            record
                .numeric(series)
                .get(&date)
                .map(|v| format_number(*v))
                .unwrap_or_default()
        };
        let reading = record.temperature.get(&date).copied().unwrap_or_default();

        self.rainfall = amount(NumericSeries::Rainfall);
        self.watts = amount(NumericSeries::Watts);
        self.morning = reading.morning.map(format_number).unwrap_or_default();
        self.afternoon = reading.afternoon.map(format_number).unwrap_or_default();
        self.comment = record.comments.get(&date).cloned().unwrap_or_default();
        self.date_input = date.format("%Y-%m-%d").to_string();
    }

    /// Rainfall in mm; an empty field means 0.
    pub fn rainfall_value(&self) -> Result<f64, FieldError> {
        Ok(parse_number("Rainfall", &self.rainfall)?.unwrap_or(0.0))
    }

    /// Watts; an empty field means 0.
    pub fn watts_value(&self) -> Result<f64, FieldError> {
        Ok(parse_number("Watts", &self.watts)?.unwrap_or(0.0))
    }

    /// Temperature readings; an empty field means no reading.
    pub fn temperature_value(&self) -> Result<TemperatureReading, FieldError> {
        Ok(TemperatureReading::new(
            parse_number("Morning", &self.morning)?,
            parse_number("Afternoon", &self.afternoon)?,
        ))
    }

    /// The date typed into the date field, if it is a valid `YYYY-MM-DD`.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date_input.trim(), "%Y-%m-%d").ok()
    }
}

/// Parses a number typed by the user. Accepts a decimal comma.
pub fn parse_number(field: &'static str, input: &str) -> Result<Option<f64>, FieldError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| FieldError {
            field,
            input: input.to_string(),
        })
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("Rainfall", ""), Ok(None));
        assert_eq!(parse_number("Rainfall", " 12 "), Ok(Some(12.0)));
        assert_eq!(parse_number("Rainfall", "2,5"), Ok(Some(2.5)));
        assert_eq!(parse_number("Morning", "-3.5"), Ok(Some(-3.5)));
        assert!(parse_number("Rainfall", "abc").is_err());
        assert!(parse_number("Rainfall", "inf").is_err());
    }

    #[test]
    fn test_fill_from_record() {
        let date: NaiveDate = "2024-05-02".parse().unwrap();
        let mut record = WeatherRecord::new();
        record.rainfall.insert(date, 3.0);
        record
            .temperature
            .insert(date, TemperatureReading::new(None, Some(21.5)));

        let mut form = EntryForm::default();
        form.fill(&record, date);
        assert_eq!(form.rainfall, "3");
        assert_eq!(form.morning, "");
        assert_eq!(form.afternoon, "21.5");
        assert_eq!(form.watts, "");
        assert_eq!(form.date_input, "2024-05-02");

        assert_eq!(form.rainfall_value(), Ok(3.0));
        assert_eq!(form.watts_value(), Ok(0.0));
        assert_eq!(
            form.temperature_value(),
            Ok(TemperatureReading::new(None, Some(21.5)))
        );
    }

    #[test]
    fn test_parsed_date() {
        let form = EntryForm {
            date_input: "2024-02-30".to_string(),
            ..Default::default()
        };
        assert!(form.parsed_date().is_none());
    }
}
