//! JSON export and import of the journal record.

use super::record::{InvalidEntry, WeatherRecord};
use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("file is not valid JSON: {0}")]
    Parse(serde_json::Error),
    #[error("unexpected file contents: {0}")]
    InvalidShape(String),
    #[error(transparent)]
    InvalidEntry(#[from] InvalidEntry),
    #[error("failed to serialize journal: {0}")]
    Serialize(serde_json::Error),
}

/// A serialized journal ready to be offered as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// Name of the export file for a given day.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("meteo-donnees-{}.json", date.format("%Y-%m-%d"))
}

/// Pretty-printed JSON of exactly the record.
pub fn export_json(record: &WeatherRecord) -> Result<String, TransferError> {
    serde_json::to_string_pretty(record).map_err(TransferError::Serialize)
}

/// Parses an import file.
///
/// The payload must be a JSON object; any of the four series may be
/// missing and unknown keys are ignored. The whole file is rejected if a
/// present series holds a malformed date or value.
pub fn parse_import(text: &str) -> Result<WeatherRecord, TransferError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(TransferError::Parse)?;

    if !value.is_object() {
        return Err(TransferError::InvalidShape(format!(
            "expected an object, found {}",
            json_kind(&value)
        )));
    }

    let record: WeatherRecord = serde_json::from_value(value)
        .map_err(|e| TransferError::InvalidShape(e.to_string()))?;
    record.validate()?;

    Ok(record)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::record::TemperatureReading;

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 3).unwrap();
        assert_eq!(export_file_name(date), "meteo-donnees-2024-07-03.json");
    }

    #[test]
    fn test_export_is_pretty_and_reimportable() {
        let mut record = WeatherRecord::new();
        let day = NaiveDate::from_ymd_opt(2024, 7, 3).unwrap();
        record.rainfall.insert(day, 12.5);
        record
            .temperature
            .insert(day, TemperatureReading::new(Some(14.0), Some(27.5)));
        record.comments.insert(day, "orage".to_string());
        record.watts.insert(day, 3100.0);

        let json = export_json(&record).unwrap();
        assert!(json.contains('\n'));
        assert_eq!(parse_import(&json).unwrap(), record);
    }

    #[test]
    fn test_parse_import_rejects_malformed_json() {
        assert!(matches!(
            parse_import("{\"rainfall\": "),
            Err(TransferError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_import_rejects_non_object() {
        for text in ["[1, 2]", "null", "42", "\"text\""] {
            assert!(matches!(
                parse_import(text),
                Err(TransferError::InvalidShape(_))
            ));
        }
    }

    #[test]
    fn test_parse_import_accepts_null_series() {
        let text = r#"{
            "rainfall": null,
            "temperature": {"2024-01-02": null},
            "watts": {"2024-01-01": 5}
        }"#;
        let record = parse_import(text).unwrap();

        assert!(record.rainfall.is_empty());
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(record.temperature[&day].is_empty());
        assert_eq!(record.watts.len(), 1);
    }

    #[test]
    fn test_parse_import_rejects_bad_entries() {
        assert!(matches!(
            parse_import(r#"{"rainfall": {"2024-02-30": 1}}"#),
            Err(TransferError::InvalidShape(_))
        ));
        assert!(matches!(
            parse_import(r#"{"watts": {"2024-02-01": "lots"}}"#),
            Err(TransferError::InvalidShape(_))
        ));
        assert!(matches!(
            parse_import(r#"{"watts": {"2024-02-01": -5}}"#),
            Err(TransferError::InvalidEntry(_))
        ));
    }

    #[test]
    fn test_parse_import_partial_object() {
        let record =
            parse_import(r#"{"comments": {"2024-02-01": "neige"}, "version": 2}"#).unwrap();
        assert_eq!(record.comments.len(), 1);
        assert!(record.rainfall.is_empty());

        assert!(parse_import("{}").unwrap().is_empty());
    }
}
