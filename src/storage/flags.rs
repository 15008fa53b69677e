//! Small synchronous string markers.
//!
//! On the web these live in localStorage, next to the IndexedDB record: the
//! legacy journal snapshot, the last export/backup timestamps and the
//! persisted settings.

use super::StorageError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Synchronous string key-value storage.
pub trait FlagStore {
    /// Returns the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, overwriting any existing value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Succeeds even if the key didn't exist.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory flags, used on native builds and in tests.
#[derive(Clone, Default)]
pub struct MemoryFlags {
    items: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryFlags {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlags {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Flags backed by the browser's localStorage.
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Default)]
pub struct LocalStorageFlags;

#[cfg(target_arch = "wasm32")]
impl LocalStorageFlags {
    pub fn new() -> Self {
        Self
    }

    fn storage(&self) -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("No window object".to_string()))?;

        window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage not available".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl FlagStore for LocalStorageFlags {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StorageError::TransactionFailed(format!("{:?}", e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::TransactionFailed(format!("{:?}", e)))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::TransactionFailed(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_flags_shared_between_clones() {
        let flags = MemoryFlags::new();
        let other = flags.clone();

        flags.set_item("last_export_date", "2024-05-01").unwrap();
        assert_eq!(
            other.get_item("last_export_date").unwrap().as_deref(),
            Some("2024-05-01")
        );

        other.remove_item("last_export_date").unwrap();
        assert!(flags.get_item("last_export_date").unwrap().is_none());
        // Removing a missing key is not an error
        assert!(flags.remove_item("last_export_date").is_ok());
    }
}
