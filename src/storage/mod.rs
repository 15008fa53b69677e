//! Generic storage abstraction for persistent data.
//!
//! Two kinds of storage back the journal:
//! - a [`KeyValueStore`] for the journal record itself (IndexedDB on WASM,
//!   an in-memory map on native targets),
//! - a [`FlagStore`] for small string markers (localStorage on WASM).
//!
//! Every value is kept as a [`StoredRow`], `{"id": <key>, "data": <value>}`,
//! in an object store whose key path is `id`. Databases created by earlier
//! releases of the journal use the same layout and open unchanged.

mod flags;
#[cfg(target_arch = "wasm32")]
mod indexeddb;

pub use flags::{FlagStore, MemoryFlags};

#[cfg(target_arch = "wasm32")]
pub use flags::LocalStorageFlags;
#[cfg(target_arch = "wasm32")]
pub use indexeddb::IndexedDbStore;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::future::Future;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    /// The database could not be opened or initialized.
    #[error("Database open failed: {0}")]
    DatabaseOpenFailed(String),
    /// A transaction failed to complete.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// The storage backend is not reachable (private mode, quota, disabled).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    /// An unexpected error occurred.
    #[error("Storage error: {0}")]
    Other(String),
}

/// A generic key-value storage interface.
///
/// Note: This trait does not require `Send` bounds since WASM is single-threaded
/// and JS types cannot be sent between threads.
pub trait KeyValueStore {
    /// Stores a value under the given key, overwriting any existing value.
    fn put<T: Serialize + 'static>(
        &self,
        key: &str,
        value: &T,
    ) -> impl Future<Output = Result<(), StorageError>>;

    /// Retrieves a value by key.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    fn get<T: DeserializeOwned + 'static>(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<T>, StorageError>>;
}

/// One stored value together with its inline key.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredRow<K, T> {
    pub id: K,
    pub data: T,
}

/// Configuration for creating a storage instance.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Name of the database (used as IndexedDB database name on web).
    pub database_name: String,
    /// Name of the object store within the database.
    pub store_name: String,
    /// Database version (incrementing triggers upgrade).
    pub version: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_name: "WeatherJournalDB".to_string(),
            store_name: "weatherData".to_string(),
            version: 1,
        }
    }
}

// In-memory implementation for native builds and tests
#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, RwLock};

    /// A simple in-memory store for native builds.
    ///
    /// Rows are kept as JSON text in the same shape IndexedDB holds them.
    /// Data is not persisted across application restarts. The store can be
    /// marked unavailable to exercise storage failure paths.
    #[derive(Clone, Default)]
    pub struct MemoryStore {
        data: Arc<RwLock<HashMap<String, String>>>,
        unavailable: Arc<AtomicBool>,
    }

    impl MemoryStore {
        pub fn new(config: StorageConfig) -> Self {
            log::debug!(
                "Using in-memory store for {}/{}",
                config.database_name,
                config.store_name
            );
            Self::default()
        }

        /// Makes every subsequent operation fail with [`StorageError::Unavailable`].
        #[cfg(test)]
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        /// Stores a raw JSON row under a key, bypassing serialization.
        #[cfg(test)]
        pub fn put_raw(&self, key: &str, json: &str) {
            if let Ok(mut data) = self.data.write() {
                data.insert(key.to_string(), json.to_string());
            }
        }

        fn check_available(&self) -> Result<(), StorageError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable(
                    "in-memory store marked unavailable".to_string(),
                ));
            }
            Ok(())
        }
    }

    impl KeyValueStore for MemoryStore {
        async fn put<T: Serialize + 'static>(
            &self,
            key: &str,
            value: &T,
        ) -> Result<(), StorageError> {
            self.check_available()?;
            let row = StoredRow { id: key, data: value };
            let json = serde_json::to_string(&row)
                .map_err(|e| StorageError::SerializationError(e.to_string()))?;
            self.data
                .write()
                .map_err(|e| StorageError::Other(e.to_string()))?
                .insert(key.to_string(), json);
            Ok(())
        }

        async fn get<T: DeserializeOwned + 'static>(
            &self,
            key: &str,
        ) -> Result<Option<T>, StorageError> {
            self.check_available()?;
            let data = self
                .data
                .read()
                .map_err(|e| StorageError::Other(e.to_string()))?;
            match data.get(key) {
                Some(json) => {
                    let row: StoredRow<String, T> = serde_json::from_str(json)
                        .map_err(|e| StorageError::SerializationError(e.to_string()))?;
                    Ok(Some(row.data))
                }
                None => Ok(None),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_memory_store_put_get() {
            let store = MemoryStore::new(StorageConfig::default());
            pollster::block_on(async {
                let missing: Option<Vec<i32>> = store.get("a").await.unwrap();
                assert!(missing.is_none());

                store.put("a", &vec![1, 2, 3]).await.unwrap();
                let value: Option<Vec<i32>> = store.get("a").await.unwrap();
                assert_eq!(value, Some(vec![1, 2, 3]));

                store.put("a", &vec![4]).await.unwrap();
                let value: Option<Vec<i32>> = store.get("a").await.unwrap();
                assert_eq!(value, Some(vec![4]));
            });
        }

        #[test]
        fn test_memory_store_row_shape() {
            let store = MemoryStore::default();
            pollster::block_on(store.put("main", &vec![7])).unwrap();

            let raw = store.data.read().unwrap()["main"].clone();
            let row: serde_json::Value = serde_json::from_str(&raw).unwrap();
            assert_eq!(row, serde_json::json!({"id": "main", "data": [7]}));
        }

        #[test]
        fn test_memory_store_unavailable() {
            let store = MemoryStore::default();
            store.set_unavailable(true);
            let result = pollster::block_on(store.put("a", &1u32));
            assert!(matches!(result, Err(StorageError::Unavailable(_))));

            store.set_unavailable(false);
            assert!(pollster::block_on(store.put("a", &1u32)).is_ok());
        }

        #[test]
        fn test_memory_store_corrupted_value() {
            let store = MemoryStore::default();
            store.put_raw("a", "{not json");
            let result: Result<Option<u32>, _> = pollster::block_on(store.get("a"));
            assert!(matches!(result, Err(StorageError::SerializationError(_))));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::MemoryStore;
