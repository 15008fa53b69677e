//! Persistence of the journal record.

use super::record::WeatherRecord;
use crate::storage::{KeyValueStore, StorageError};

/// Fixed key the record is stored under.
const RECORD_KEY: &str = "main";

/// Holds exactly one [`WeatherRecord`] in a key-value store.
#[derive(Clone)]
pub struct RecordStore<S> {
    inner: S,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Reads the record, or an empty one if nothing was stored yet.
    pub async fn get(&self) -> Result<WeatherRecord, StorageError> {
        let record = self.inner.get::<WeatherRecord>(RECORD_KEY).await?;
        Ok(record.unwrap_or_default())
    }

    /// Replaces the stored record as a single unit.
    pub async fn set(&self, record: &WeatherRecord) -> Result<(), StorageError> {
        self.inner.put(RECORD_KEY, record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_get_empty_when_missing() {
        let store = RecordStore::new(MemoryStore::default());
        let record = pollster::block_on(store.get()).unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_set_then_get() {
        let store = RecordStore::new(MemoryStore::default());
        let mut record = WeatherRecord::new();
        record
            .watts
            .insert("2024-06-01".parse().unwrap(), 2400.0);

        pollster::block_on(async {
            store.set(&record).await.unwrap();
            assert_eq!(store.get().await.unwrap(), record);
        });
    }

    #[test]
    fn test_corrupted_record_is_an_error() {
        let backend = MemoryStore::default();
        backend.put_raw(
            RECORD_KEY,
            r#"{"id": "main", "data": {"rainfall": {"not-a-date": 1}}}"#,
        );
        let store = RecordStore::new(backend);
        assert!(matches!(
            pollster::block_on(store.get()),
            Err(StorageError::SerializationError(_))
        ));
    }

    #[test]
    fn test_reads_row_written_by_earlier_release() {
        let backend = MemoryStore::default();
        backend.put_raw(
            RECORD_KEY,
            r#"{"id": "main", "data": {"rainfall": {"2023-11-05": 2}, "comments": {}}}"#,
        );
        let store = RecordStore::new(backend);

        let record = pollster::block_on(store.get()).unwrap();
        assert_eq!(record.rainfall[&"2023-11-05".parse().unwrap()], 2.0);
        assert!(record.watts.is_empty());
    }

    #[test]
    fn test_unavailable_store() {
        let backend = MemoryStore::default();
        backend.set_unavailable(true);
        let store = RecordStore::new(backend);
        assert!(pollster::block_on(store.set(&WeatherRecord::new())).is_err());
        assert!(pollster::block_on(store.get()).is_err());
    }
}
