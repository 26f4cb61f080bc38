//! Local key/value storage.
//!
//! A tiny string-to-string store that plays the role a browser's
//! `localStorage` plays for a web client: feature flag overrides and the
//! encrypted token live here between runs.

use std::{collections::BTreeMap, fs, path::PathBuf, sync::Mutex};

use serde::{Deserialize, Serialize};

use crate::crypto::{decrypt_token, encrypt_token};
use crate::error::{Result, UtilsError};

/// Storage key under which the encrypted token is cached
pub const ENCRYPTED_TOKEN_KEY: &str = "PACS_ENCRYPTED_TOKEN";

const CURRENT_VERSION: u32 = 1;

/// String key/value store
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

// ==================== File Storage ====================

#[derive(Serialize, Deserialize, Default)]
struct StorageFile {
    version: u32,
    items: BTreeMap<String, String>,
}

/// JSON file backed storage
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn with_items<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| UtilsError::Storage("Storage lock poisoned".into()))?;
        let mut items = self.load_locked()?;
        op(&mut items);
        self.persist_locked(items)
    }

    fn load_locked(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read(&self.path)?;
        if raw.is_empty() {
            return Ok(BTreeMap::new());
        }
        let file: StorageFile = serde_json::from_slice(&raw)?;
        Ok(file.items)
    }

    fn persist_locked(&self, items: BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = StorageFile {
            version: CURRENT_VERSION,
            items,
        };
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| UtilsError::Storage("Storage lock poisoned".into()))?;
        Ok(self.load_locked()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        log::debug!("Storing item {} in {}", key, self.path.display());
        self.with_items(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.with_items(|items| {
            items.remove(key);
        })
    }
}

// ==================== Memory Storage ====================

/// In-memory storage, nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| UtilsError::Storage("Storage lock poisoned".into()))
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items()?.remove(key);
        Ok(())
    }
}

// ==================== Token Cache ====================

/// Caches the API token encrypted with a user password.
pub struct TokenCache<'a> {
    storage: &'a dyn LocalStorage,
}

impl<'a> TokenCache<'a> {
    pub fn new(storage: &'a dyn LocalStorage) -> Self {
        Self { storage }
    }

    pub fn save(&self, password: &str, token: &str) -> Result<()> {
        let envelope = encrypt_token(password, token)?;
        self.storage.set_item(ENCRYPTED_TOKEN_KEY, &envelope)
    }

    /// Returns the cached token, `None` if nothing is cached.
    pub fn load(&self, password: &str) -> Result<Option<String>> {
        match self.storage.get_item(ENCRYPTED_TOKEN_KEY)? {
            Some(envelope) => decrypt_token(password, &envelope).map(Some),
            None => Ok(None),
        }
    }

    pub fn has_token(&self) -> Result<bool> {
        Ok(self.storage.get_item(ENCRYPTED_TOKEN_KEY)?.is_some())
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.remove_item(ENCRYPTED_TOKEN_KEY)
    }
}
