//! The weather journal: record model, persistence and queries.
//!
//! ## Storage Layout
//! ```text
//! IndexedDB "WeatherJournalDB"
//! └── weatherData
//!     └── "main"  - the whole WeatherRecord as JSON
//!
//! localStorage
//! ├── weather_data             - legacy snapshot, removed once migrated
//! ├── last_export_date         - RFC 3339 timestamp of the last export
//! ├── last_backup_date         - RFC 3339 timestamp of the last save
//! └── weather_journal_settings - JournalSettings as JSON
//! ```
//!
//! The [`Journal`] keeps an in-memory copy of the record. Every mutation
//! updates that copy immediately and returns a [`SaveFuture`] that writes a
//! snapshot of the whole record. Saves own their snapshot, so several can be
//! in flight; the one that completes last determines the stored record.

pub mod aggregate;
pub mod migration;
pub mod record;
pub mod reminder;
pub mod store;
pub mod transfer;

pub use migration::{migrate_legacy, MigrationOutcome};
pub use record::{NumericSeries, Series, TemperatureReading, WeatherRecord};
pub use reminder::{backup_reminder, needs_unload_warning};
pub use store::RecordStore;
pub use transfer::{export_file_name, export_json, parse_import, ExportFile, TransferError};

use crate::storage::{FlagStore, KeyValueStore, StorageError};
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::future::{FutureExt, LocalBoxFuture};
use record::{check_amount, check_temperature, InvalidEntry};

/// localStorage key of the last export timestamp.
pub const LAST_EXPORT_KEY: &str = "last_export_date";
/// localStorage key of the last successful save timestamp.
pub const LAST_BACKUP_KEY: &str = "last_backup_date";

/// Errors surfaced by journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error(transparent)]
    InvalidValue(#[from] InvalidEntry),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// A pending write of the whole record.
pub type SaveFuture = LocalBoxFuture<'static, Result<(), JournalError>>;

/// Order of [`Journal::dates_with_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    /// Most recent first, as shown in history lists.
    #[default]
    Descending,
}

/// Typed access to the four series, backed by a persistent store.
pub struct Journal<S, F> {
    record: WeatherRecord,
    store: RecordStore<S>,
    flags: F,
}

impl<S, F> Journal<S, F>
where
    S: KeyValueStore + Clone + 'static,
    F: FlagStore + Clone + 'static,
{
    /// Migrates any legacy snapshot, then loads the stored record.
    ///
    /// Neither step is fatal: a failed migration is logged and retried on the
    /// next load, a failed read leaves the journal empty but usable.
    pub async fn open(store: S, flags: F) -> Self {
        let store = RecordStore::new(store);

        match migrate_legacy(&store, &flags).await {
            Ok(MigrationOutcome::Skipped) => {}
            Ok(MigrationOutcome::Migrated { entries }) => {
                log::info!("Legacy migration complete ({} entries)", entries);
            }
            Err(e) => {
                log::warn!("Legacy migration failed, will retry on next load: {}", e);
            }
        }

        let record = match store.get().await {
            Ok(record) => {
                log::info!("Loaded journal with {} entries", record.entry_count());
                record
            }
            Err(e) => {
                log::error!("Failed to load journal, starting empty: {}", e);
                WeatherRecord::default()
            }
        };

        Self {
            record,
            store,
            flags,
        }
    }

    /// The in-memory record.
    pub fn record(&self) -> &WeatherRecord {
        &self.record
    }

    pub fn has_data(&self) -> bool {
        !self.record.is_empty()
    }

    // ========================================================================
    // Series accessors
    // ========================================================================

    /// Rainfall in millimetres, 0 when nothing was recorded.
    pub fn rainfall(&self, date: NaiveDate) -> f64 {
        self.amount(NumericSeries::Rainfall, date)
    }

    pub fn set_rainfall(
        &mut self,
        date: NaiveDate,
        millimetres: f64,
    ) -> Result<SaveFuture, JournalError> {
        self.set_amount(NumericSeries::Rainfall, date, millimetres)
    }

    /// Temperature readings, both `None` when nothing was recorded.
    pub fn temperature(&self, date: NaiveDate) -> TemperatureReading {
        self.record
            .temperature
            .get(&date)
            .copied()
            .unwrap_or_default()
    }

    /// Records temperatures for a day. Clearing both readings removes the day.
    pub fn set_temperature(
        &mut self,
        date: NaiveDate,
        morning: Option<f64>,
        afternoon: Option<f64>,
    ) -> Result<SaveFuture, JournalError> {
        let reading = TemperatureReading::new(morning, afternoon);
        check_temperature(date, &reading)?;

        if reading.is_empty() {
            self.record.temperature.remove(&date);
        } else {
            self.record.temperature.insert(date, reading);
        }
        Ok(self.save())
    }

    /// The comment for a day, empty when there is none.
    pub fn comment(&self, date: NaiveDate) -> &str {
        self.record
            .comments
            .get(&date)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Records a comment. Blank text removes the day's comment.
    pub fn set_comment(&mut self, date: NaiveDate, text: &str) -> SaveFuture {
        if text.trim().is_empty() {
            self.record.comments.remove(&date);
        } else {
            self.record.comments.insert(date, text.to_string());
        }
        self.save()
    }

    /// Power reading in watts, 0 when nothing was recorded.
    pub fn watts(&self, date: NaiveDate) -> f64 {
        self.amount(NumericSeries::Watts, date)
    }

    pub fn set_watts(&mut self, date: NaiveDate, watts: f64) -> Result<SaveFuture, JournalError> {
        self.set_amount(NumericSeries::Watts, date, watts)
    }

    fn amount(&self, series: NumericSeries, date: NaiveDate) -> f64 {
        self.record
            .numeric(series)
            .get(&date)
            .copied()
            .unwrap_or(0.0)
    }

    fn set_amount(
        &mut self,
        series: NumericSeries,
        date: NaiveDate,
        value: f64,
    ) -> Result<SaveFuture, JournalError> {
        check_amount(series, date, value)?;
        self.record.numeric_mut(series).insert(date, value);
        Ok(self.save())
    }

    /// Dates that hold an entry in `series`.
    pub fn dates_with_data(&self, series: Series, order: SortOrder) -> Vec<NaiveDate> {
        let mut dates = self.record.dates(series);
        if order == SortOrder::Descending {
            dates.reverse();
        }
        dates
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Writes a snapshot of the current record, then stamps the backup date.
    pub fn save(&self) -> SaveFuture {
        let store = self.store.clone();
        let flags = self.flags.clone();
        let snapshot = self.record.clone();

        async move {
            store.set(&snapshot).await?;
            if let Err(e) = flags.set_item(LAST_BACKUP_KEY, &Utc::now().to_rfc3339()) {
                log::warn!("Failed to record backup date: {}", e);
            }
            Ok::<(), JournalError>(())
        }
        .boxed_local()
    }

    /// Merges an imported record (imported values win) and saves.
    pub fn import(&mut self, imported: WeatherRecord) -> SaveFuture {
        let entries = self.record.merge_from(imported);
        log::info!("Imported {} entries", entries);
        self.save()
    }

    /// Parses and validates an import file, then merges it.
    ///
    /// Returns the number of imported entries with the pending save. A file
    /// that fails to parse or validate leaves the record untouched.
    pub fn import_text(&mut self, text: &str) -> Result<(usize, SaveFuture), JournalError> {
        let imported = parse_import(text)?;
        let entries = imported.entry_count();
        Ok((entries, self.import(imported)))
    }

    /// Serializes the stored record and stamps the export date.
    ///
    /// Reads from the persistent store rather than the in-memory copy, so
    /// the file reflects what has actually been saved.
    pub fn export(
        &self,
        today: NaiveDate,
    ) -> LocalBoxFuture<'static, Result<ExportFile, JournalError>> {
        let store = self.store.clone();
        let flags = self.flags.clone();

        async move {
            let record = store.get().await?;
            let contents = export_json(&record)?;

            if let Err(e) = flags.set_item(LAST_EXPORT_KEY, &Utc::now().to_rfc3339()) {
                log::warn!("Failed to record export date: {}", e);
            }
            log::info!("Exported {} entries", record.entry_count());

            Ok::<_, JournalError>(ExportFile {
                file_name: export_file_name(today),
                contents,
            })
        }
        .boxed_local()
    }

    /// Timestamp of the last export, if any.
    pub fn last_export(&self) -> Option<DateTime<Utc>> {
        self.timestamp_flag(LAST_EXPORT_KEY)
    }

    /// Timestamp of the last successful save, if any.
    pub fn last_backup(&self) -> Option<DateTime<Utc>> {
        self.timestamp_flag(LAST_BACKUP_KEY)
    }

    fn timestamp_flag(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = match self.flags.get_item(key) {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("Failed to read {}: {}", key, e);
                return None;
            }
        };

        match DateTime::parse_from_rfc3339(&raw) {
            Ok(timestamp) => Some(timestamp.with_timezone(&Utc)),
            Err(e) => {
                log::warn!("Ignoring malformed {} value {:?}: {}", key, raw, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryFlags, MemoryStore};
    use migration::LEGACY_STORAGE_KEY;

    type TestJournal = Journal<MemoryStore, MemoryFlags>;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn open() -> (TestJournal, MemoryStore, MemoryFlags) {
        let store = MemoryStore::default();
        let flags = MemoryFlags::new();
        let journal = pollster::block_on(Journal::open(store.clone(), flags.clone()));
        (journal, store, flags)
    }

    fn stored(store: &MemoryStore) -> WeatherRecord {
        pollster::block_on(RecordStore::new(store.clone()).get()).unwrap()
    }

    #[test]
    fn test_defaults_for_missing_dates() {
        let (journal, _, _) = open();
        let day = date("2024-04-10");
        assert_eq!(journal.rainfall(day), 0.0);
        assert_eq!(journal.watts(day), 0.0);
        assert_eq!(journal.comment(day), "");
        assert_eq!(journal.temperature(day), TemperatureReading::new(None, None));
        assert!(!journal.has_data());
    }

    #[test]
    fn test_set_then_get_each_series() {
        let (mut journal, store, flags) = open();
        let day = date("2024-04-10");

        pollster::block_on(journal.set_rainfall(day, 4.2).unwrap()).unwrap();
        pollster::block_on(journal.set_temperature(day, Some(7.0), Some(15.5)).unwrap()).unwrap();
        pollster::block_on(journal.set_comment(day, "averses")).unwrap();
        pollster::block_on(journal.set_watts(day, 1850.0).unwrap()).unwrap();

        assert_eq!(journal.rainfall(day), 4.2);
        assert_eq!(journal.temperature(day), TemperatureReading::new(Some(7.0), Some(15.5)));
        assert_eq!(journal.comment(day), "averses");
        assert_eq!(journal.watts(day), 1850.0);

        // Every mutation was flushed
        assert_eq!(&stored(&store), journal.record());
        assert!(flags.get_item(LAST_BACKUP_KEY).unwrap().is_some());
        assert!(journal.last_backup().is_some());
    }

    #[test]
    fn test_mutation_applies_before_save_completes() {
        let (mut journal, store, _) = open();
        let day = date("2024-04-10");

        let save = journal.set_rainfall(day, 1.0).unwrap();
        assert_eq!(journal.rainfall(day), 1.0);
        assert!(stored(&store).rainfall.is_empty());

        pollster::block_on(save).unwrap();
        assert_eq!(stored(&store).rainfall[&day], 1.0);
    }

    #[test]
    fn test_blank_comment_removes_key() {
        let (mut journal, store, _) = open();
        let day = date("2024-04-10");

        pollster::block_on(journal.set_comment(day, "brouillard")).unwrap();
        pollster::block_on(journal.set_comment(day, "   ")).unwrap();

        assert_eq!(journal.comment(day), "");
        assert!(!journal.record().comments.contains_key(&day));
        assert!(stored(&store).comments.is_empty());
    }

    #[test]
    fn test_clearing_temperature_removes_key() {
        let (mut journal, _, _) = open();
        let day = date("2024-04-10");

        pollster::block_on(journal.set_temperature(day, Some(3.0), None).unwrap()).unwrap();
        pollster::block_on(journal.set_temperature(day, None, None).unwrap()).unwrap();
        assert!(journal.record().temperature.is_empty());
    }

    #[test]
    fn test_negative_rainfall_rejected_without_mutation() {
        let (mut journal, _, _) = open();
        let day = date("2024-04-10");

        assert!(matches!(
            journal.set_rainfall(day, -3.0),
            Err(JournalError::InvalidValue(_))
        ));
        assert!(journal.set_watts(day, f64::NAN).is_err());
        assert!(journal.set_temperature(day, Some(f64::INFINITY), None).is_err());
        assert!(!journal.has_data());
    }

    #[test]
    fn test_dates_with_data_order() {
        let (mut journal, _, _) = open();
        for (day, mm) in [("2024-02-01", 1.0), ("2023-12-31", 2.0), ("2024-01-15", 3.0)] {
            let _ = journal.set_rainfall(date(day), mm).unwrap();
        }

        assert_eq!(
            journal.dates_with_data(Series::Rainfall, SortOrder::Descending),
            vec![date("2024-02-01"), date("2024-01-15"), date("2023-12-31")]
        );
        assert_eq!(
            journal.dates_with_data(Series::Rainfall, SortOrder::Ascending),
            vec![date("2023-12-31"), date("2024-01-15"), date("2024-02-01")]
        );
        assert!(journal
            .dates_with_data(Series::Comments, SortOrder::default())
            .is_empty());
    }

    #[test]
    fn test_save_failure_is_reported_and_memory_kept() {
        let (mut journal, store, flags) = open();
        store.set_unavailable(true);

        let day = date("2024-04-10");
        let result = pollster::block_on(journal.set_rainfall(day, 6.0).unwrap());
        assert!(matches!(result, Err(JournalError::Storage(_))));
        assert_eq!(journal.rainfall(day), 6.0);
        assert!(flags.get_item(LAST_BACKUP_KEY).unwrap().is_none());
    }

    #[test]
    fn test_open_runs_migration_first() {
        let store = MemoryStore::default();
        let flags = MemoryFlags::new();

        let mut existing = WeatherRecord::new();
        existing.rainfall.insert(date("2024-01-01"), 5.0);
        pollster::block_on(RecordStore::new(store.clone()).set(&existing)).unwrap();
        flags
            .set_item(
                LEGACY_STORAGE_KEY,
                r#"{"rainfall": {"2024-01-01": 10, "2024-01-02": 3}}"#,
            )
            .unwrap();

        let journal: TestJournal = pollster::block_on(Journal::open(store, flags.clone()));
        assert_eq!(journal.rainfall(date("2024-01-01")), 10.0);
        assert_eq!(journal.rainfall(date("2024-01-02")), 3.0);
        assert!(flags.get_item(LEGACY_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_open_survives_failed_migration() {
        let store = MemoryStore::default();
        let flags = MemoryFlags::new();

        let mut existing = WeatherRecord::new();
        existing.watts.insert(date("2024-01-01"), 900.0);
        pollster::block_on(RecordStore::new(store.clone()).set(&existing)).unwrap();
        flags.set_item(LEGACY_STORAGE_KEY, "not json").unwrap();

        let journal: TestJournal = pollster::block_on(Journal::open(store, flags.clone()));
        assert_eq!(journal.watts(date("2024-01-01")), 900.0);
        assert!(flags.get_item(LEGACY_STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_open_with_unavailable_store_starts_empty() {
        let store = MemoryStore::default();
        store.set_unavailable(true);
        let journal: TestJournal = pollster::block_on(Journal::open(store, MemoryFlags::new()));
        assert!(!journal.has_data());
    }

    #[test]
    fn test_import_merges_imported_values_win() {
        let (mut journal, store, _) = open();
        let _ = journal.set_rainfall(date("2024-01-01"), 5.0).unwrap();
        let _ = journal.set_comment(date("2024-01-01"), "gel");

        let imported =
            parse_import(r#"{"rainfall": {"2024-01-01": 7, "2024-01-03": 1}, "watts": {}}"#)
                .unwrap();
        pollster::block_on(journal.import(imported)).unwrap();

        assert_eq!(journal.rainfall(date("2024-01-01")), 7.0);
        assert_eq!(journal.rainfall(date("2024-01-03")), 1.0);
        assert_eq!(journal.comment(date("2024-01-01")), "gel");
        assert_eq!(&stored(&store), journal.record());
    }

    #[test]
    fn test_rejected_import_leaves_record_unchanged() {
        let (mut journal, store, _) = open();
        pollster::block_on(journal.set_rainfall(date("2024-01-01"), 5.0).unwrap()).unwrap();
        let before = journal.record().clone();

        for text in [
            "{\"rainfall\": {",
            "[1, 2]",
            r#"{"rainfall": {"2024-01-01": 9}, "watts": {"2024-01-02": -1}}"#,
        ] {
            assert!(journal.import_text(text).is_err(), "accepted {}", text);
            assert_eq!(journal.record(), &before);
        }
        assert_eq!(stored(&store), before);

        let (entries, save) = journal
            .import_text(r#"{"rainfall": {"2024-01-01": 9}}"#)
            .unwrap();
        pollster::block_on(save).unwrap();
        assert_eq!(entries, 1);
        assert_eq!(stored(&store).rainfall[&date("2024-01-01")], 9.0);
    }

    #[test]
    fn test_export_then_import_is_idempotent() {
        let (mut journal, _, flags) = open();
        let day = date("2024-08-15");
        pollster::block_on(journal.set_rainfall(day, 22.0).unwrap()).unwrap();
        pollster::block_on(journal.set_temperature(day, Some(18.0), None).unwrap()).unwrap();
        pollster::block_on(journal.set_comment(day, "orageux")).unwrap();
        let before = journal.record().clone();

        let file = pollster::block_on(journal.export(day)).unwrap();
        assert_eq!(file.file_name, "meteo-donnees-2024-08-15.json");
        assert!(flags.get_item(LAST_EXPORT_KEY).unwrap().is_some());
        assert!(journal.last_export().is_some());

        let imported = parse_import(&file.contents).unwrap();
        pollster::block_on(journal.import(imported)).unwrap();
        assert_eq!(journal.record(), &before);
    }

    #[test]
    fn test_malformed_timestamp_flag_ignored() {
        let (journal, _, flags) = open();
        flags.set_item(LAST_EXPORT_KEY, "yesterday").unwrap();
        assert!(journal.last_export().is_none());
    }
}
