//! One-time migration of the legacy localStorage journal.
//!
//! Earlier versions kept the whole record as a JSON string in localStorage.
//! On load, that snapshot is merged into the IndexedDB record and removed.
//! The key is only removed after the merged record has been written, so a
//! failed migration is retried on the next load.

use super::record::{InvalidEntry, WeatherRecord};
use super::store::RecordStore;
use crate::storage::{FlagStore, KeyValueStore, StorageError};

/// localStorage key of the legacy snapshot.
pub const LEGACY_STORAGE_KEY: &str = "weather_data";

/// What a migration run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No legacy snapshot was found.
    Skipped,
    /// The snapshot was merged and removed.
    Migrated { entries: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("legacy snapshot is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("legacy snapshot rejected: {0}")]
    Invalid(#[from] InvalidEntry),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Merges the legacy snapshot into the stored record.
///
/// Legacy values win on key collision.
pub async fn migrate_legacy<S, F>(
    store: &RecordStore<S>,
    flags: &F,
) -> Result<MigrationOutcome, MigrationError>
where
    S: KeyValueStore,
    F: FlagStore,
{
    let Some(raw) = flags.get_item(LEGACY_STORAGE_KEY)? else {
        return Ok(MigrationOutcome::Skipped);
    };

    log::info!("Legacy journal found in localStorage, migrating to IndexedDB");

    let legacy: WeatherRecord = serde_json::from_str(&raw)?;
    legacy.validate()?;

    let mut current = store.get().await?;
    let entries = current.merge_from(legacy);
    store.set(&current).await?;

    flags.remove_item(LEGACY_STORAGE_KEY)?;
    log::info!("Migrated {} legacy entries, legacy snapshot removed", entries);

    Ok(MigrationOutcome::Migrated { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryFlags, MemoryStore};

    fn date(s: &str) -> chrono::NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_no_legacy_snapshot() {
        let store = RecordStore::new(MemoryStore::default());
        let flags = MemoryFlags::new();
        let outcome = pollster::block_on(migrate_legacy(&store, &flags)).unwrap();
        assert_eq!(outcome, MigrationOutcome::Skipped);
    }

    #[test]
    fn test_legacy_wins_and_is_removed() {
        let store = RecordStore::new(MemoryStore::default());
        let flags = MemoryFlags::new();

        let mut current = WeatherRecord::new();
        current.rainfall.insert(date("2024-01-01"), 5.0);
        pollster::block_on(store.set(&current)).unwrap();

        flags
            .set_item(
                LEGACY_STORAGE_KEY,
                r#"{"rainfall": {"2024-01-01": 10, "2024-01-02": 3}}"#,
            )
            .unwrap();

        let outcome = pollster::block_on(migrate_legacy(&store, &flags)).unwrap();
        assert_eq!(outcome, MigrationOutcome::Migrated { entries: 2 });

        let stored = pollster::block_on(store.get()).unwrap();
        assert_eq!(stored.rainfall.len(), 2);
        assert_eq!(stored.rainfall[&date("2024-01-01")], 10.0);
        assert_eq!(stored.rainfall[&date("2024-01-02")], 3.0);
        assert!(flags.get_item(LEGACY_STORAGE_KEY).unwrap().is_none());

        // Second run finds nothing to do
        let outcome = pollster::block_on(migrate_legacy(&store, &flags)).unwrap();
        assert_eq!(outcome, MigrationOutcome::Skipped);
    }

    #[test]
    fn test_other_series_are_kept() {
        let store = RecordStore::new(MemoryStore::default());
        let flags = MemoryFlags::new();

        let mut current = WeatherRecord::new();
        current.watts.insert(date("2024-01-01"), 800.0);
        current.comments.insert(date("2024-01-01"), "sunny".to_string());
        pollster::block_on(store.set(&current)).unwrap();

        flags
            .set_item(
                LEGACY_STORAGE_KEY,
                r#"{"comments": {"2024-01-02": "fog"}, "temperature": {}}"#,
            )
            .unwrap();

        pollster::block_on(migrate_legacy(&store, &flags)).unwrap();
        let stored = pollster::block_on(store.get()).unwrap();
        assert_eq!(stored.watts[&date("2024-01-01")], 800.0);
        assert_eq!(stored.comments.len(), 2);
    }

    #[test]
    fn test_null_legacy_series_migrates() {
        let store = RecordStore::new(MemoryStore::default());
        let flags = MemoryFlags::new();

        let mut current = WeatherRecord::new();
        current.comments.insert(date("2024-01-01"), "sunny".to_string());
        pollster::block_on(store.set(&current)).unwrap();

        flags
            .set_item(
                LEGACY_STORAGE_KEY,
                r#"{"rainfall": {"2024-01-02": 4}, "comments": null, "watts": null}"#,
            )
            .unwrap();

        let outcome = pollster::block_on(migrate_legacy(&store, &flags)).unwrap();
        assert_eq!(outcome, MigrationOutcome::Migrated { entries: 1 });
        assert!(flags.get_item(LEGACY_STORAGE_KEY).unwrap().is_none());

        let stored = pollster::block_on(store.get()).unwrap();
        assert_eq!(stored.rainfall[&date("2024-01-02")], 4.0);
        assert_eq!(stored.comments[&date("2024-01-01")], "sunny");
    }

    #[test]
    fn test_malformed_legacy_left_in_place() {
        let store = RecordStore::new(MemoryStore::default());
        let flags = MemoryFlags::new();
        flags.set_item(LEGACY_STORAGE_KEY, "{broken").unwrap();

        let result = pollster::block_on(migrate_legacy(&store, &flags));
        assert!(matches!(result, Err(MigrationError::Parse(_))));
        assert!(flags.get_item(LEGACY_STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_write_failure_keeps_legacy_for_retry() {
        let backend = MemoryStore::default();
        let store = RecordStore::new(backend.clone());
        let flags = MemoryFlags::new();
        flags
            .set_item(LEGACY_STORAGE_KEY, r#"{"rainfall": {"2024-01-01": 2}}"#)
            .unwrap();

        backend.set_unavailable(true);
        let result = pollster::block_on(migrate_legacy(&store, &flags));
        assert!(matches!(result, Err(MigrationError::Storage(_))));
        assert!(flags.get_item(LEGACY_STORAGE_KEY).unwrap().is_some());

        backend.set_unavailable(false);
        let outcome = pollster::block_on(migrate_legacy(&store, &flags)).unwrap();
        assert_eq!(outcome, MigrationOutcome::Migrated { entries: 1 });
    }
}
