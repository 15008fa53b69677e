//! IndexedDB-based storage implementation for WASM targets.
//!
//! Each value is written as a plain JS object `{id, data}` into an object
//! store keyed by the inline `id` property, the layout the journal has
//! always used in the browser.

use super::{KeyValueStore, StorageConfig, StorageError, StoredRow};
use serde::{de::DeserializeOwned, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{IdbDatabase, IdbObjectStore, IdbRequest, IdbTransactionMode};

/// Inline key property of every row.
const KEY_PATH: &str = "id";

/// IndexedDB-based key-value store.
#[derive(Clone)]
pub struct IndexedDbStore {
    config: StorageConfig,
    db: Rc<RefCell<Option<IdbDatabase>>>,
}

impl IndexedDbStore {
    /// The database is opened lazily on first use.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: Rc::new(RefCell::new(None)),
        }
    }

    async fn database(&self) -> Result<IdbDatabase, StorageError> {
        if let Some(db) = self.db.borrow().as_ref() {
            return Ok(db.clone());
        }

        let db = open_database(&self.config).await?;
        self.db.replace(Some(db.clone()));
        Ok(db)
    }

    /// Opens a single-store transaction and returns its object store.
    async fn object_store(&self, mode: IdbTransactionMode) -> Result<IdbObjectStore, StorageError> {
        let db = self.database().await?;
        let name = &self.config.store_name;

        db.transaction_with_str_and_mode(name, mode)
            .and_then(|tx| tx.object_store(name))
            .map_err(|e| StorageError::TransactionFailed(format!("{:?}", e)))
    }
}

impl KeyValueStore for IndexedDbStore {
    async fn put<T: Serialize + 'static>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        // Maps become plain objects, so the row stays readable as JSON
        let row = StoredRow { id: key, data: value }
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let store = self.object_store(IdbTransactionMode::Readwrite).await?;
        let request = store
            .put(&row)
            .map_err(|e| StorageError::TransactionFailed(format!("{:?}", e)))?;

        wait_for_request(&request).await?;
        log::debug!("Stored row {} in {}", key, self.config.store_name);
        Ok(())
    }

    async fn get<T: DeserializeOwned + 'static>(
        &self,
        key: &str,
    ) -> Result<Option<T>, StorageError> {
        let store = self.object_store(IdbTransactionMode::Readonly).await?;
        let request = store
            .get(&JsValue::from_str(key))
            .map_err(|e| StorageError::TransactionFailed(format!("{:?}", e)))?;

        let found = wait_for_request(&request).await?;
        if found.is_undefined() || found.is_null() {
            return Ok(None);
        }

        let row: StoredRow<String, T> = serde_wasm_bindgen::from_value(found)
            .map_err(|e| StorageError::SerializationError(format!("row {}: {}", key, e)))?;
        Ok(Some(row.data))
    }
}

/// Opens the database, creating the keyed object store on first use.
async fn open_database(config: &StorageConfig) -> Result<IdbDatabase, StorageError> {
    let factory = web_sys::window()
        .ok_or_else(|| StorageError::DatabaseOpenFailed("No window object".to_string()))?
        .indexed_db()
        .map_err(|e| StorageError::DatabaseOpenFailed(format!("{:?}", e)))?
        .ok_or_else(|| StorageError::Unavailable("IndexedDB not available".to_string()))?;

    let request = factory
        .open_with_u32(&config.database_name, config.version)
        .map_err(|e| StorageError::DatabaseOpenFailed(format!("{:?}", e)))?;

    let store_name = config.store_name.clone();
    let upgrade_request = request.clone();
    let on_upgrade = Closure::wrap(Box::new(move |_event: web_sys::IdbVersionChangeEvent| {
        let Some(db) = upgrade_request
            .result()
            .ok()
            .and_then(|result| result.dyn_into::<IdbDatabase>().ok())
        else {
            log::error!("IndexedDB upgrade without a database");
            return;
        };

        if db.object_store_names().contains(&store_name) {
            return;
        }

        let params = web_sys::IdbObjectStoreParameters::new();
        params.set_key_path(&JsValue::from_str(KEY_PATH));
        match db.create_object_store_with_optional_parameters(&store_name, &params) {
            Ok(_) => log::info!("Created object store {} keyed by {}", store_name, KEY_PATH),
            Err(e) => log::error!("Failed to create object store {}: {:?}", store_name, e),
        }
    }) as Box<dyn FnMut(_)>);

    request.set_onupgradeneeded(Some(on_upgrade.as_ref().unchecked_ref()));
    let opened = wait_for_request(&request).await;
    request.set_onupgradeneeded(None);
    drop(on_upgrade);

    let db: IdbDatabase = opened?
        .dyn_into()
        .map_err(|_| StorageError::DatabaseOpenFailed("Result is not a database".to_string()))?;

    log::info!(
        "Opened IndexedDB {} v{} ({})",
        config.database_name,
        config.version,
        config.store_name
    );
    Ok(db)
}

/// Resolves once the request fires `success` or `error`.
async fn wait_for_request(request: &IdbRequest) -> Result<JsValue, StorageError> {
    let (tx, rx) = futures_channel::oneshot::channel::<Result<JsValue, StorageError>>();
    let tx = Rc::new(RefCell::new(Some(tx)));

    let done = {
        let tx = tx.clone();
        let request = request.clone();
        Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let value = request.result().unwrap_or(JsValue::UNDEFINED);
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Ok(value));
            }
        }) as Box<dyn FnMut(_)>)
    };

    let failed = {
        let request = request.clone();
        Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let message = match request.error() {
                Ok(Some(e)) => format!("{}: {}", e.name(), e.message()),
                _ => "Unknown error".to_string(),
            };
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Err(StorageError::TransactionFailed(message)));
            }
        }) as Box<dyn FnMut(_)>)
    };

    request.set_onsuccess(Some(done.as_ref().unchecked_ref()));
    request.set_onerror(Some(failed.as_ref().unchecked_ref()));

    // Closures must outlive the request
    let outcome = rx.await;
    request.set_onsuccess(None);
    request.set_onerror(None);
    drop(done);
    drop(failed);

    outcome.map_err(|_| StorageError::Other("Request dropped".to_string()))?
}
