#![deny(warnings)]

//! Persistence layer: JSON key/value stores and change subscriptions.
//!
//! The core never touches storage directly. Components receive a [`Store`]
//! and read a synchronous snapshot at render time, writing back after every
//! mutation. [`ObservableStore`] publishes a [`StoreEvent`] for each write so
//! views can refresh on change instead of polling.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Store keys used across the application.
pub mod keys {
    /// Duplicador challenge progress.
    pub const DUPLICADOR_PROGRESS: &str = "duplicador-progress";
    /// Last wealth level seen, for level-up detection.
    pub const PREVIOUS_LEVEL: &str = "patripoly_previous_level";
    /// Assets and liabilities.
    pub const ASSETS: &str = "patripoly_assets";
    /// Passive income sources.
    pub const CASHFLOW_SOURCES: &str = "cashflow-sources";
    /// Active (work) income.
    pub const ACTIVE_INCOME: &str = "ingresos-activos";
    /// Dated expenses.
    pub const EXPENSES: &str = "gastos-expenses";
    /// User-defined expense categories.
    pub const EXPENSE_CATEGORIES: &str = "gastos-categories";
    /// Savings deposits and withdrawals.
    pub const SAVINGS: &str = "ahorros-fondo";
    /// Desired lifestyle items.
    pub const LIFESTYLE_ITEMS: &str = "calidad-vida-items";

    /// Keys whose records feed the wealth aggregate.
    pub const LEDGER: [&str; 6] = [
        ASSETS,
        CASHFLOW_SOURCES,
        ACTIVE_INCOME,
        EXPENSES,
        SAVINGS,
        LIFESTYLE_ITEMS,
    ];
}

/// Errors raised by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Keys are limited to ASCII letters, digits, `-` and `_`.
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),
    #[error("stored value under {key} could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("value for {key} could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Synchronous key/value persistence of JSON documents.
pub trait Store {
    /// Value under `key`, or `None` when nothing was saved.
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;
    /// Replace the value under `key`.
    fn save(&mut self, key: &str, value: Value) -> Result<(), StoreError>;
    /// Delete `key`; deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: Store + ?Sized> Store for &mut S {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).save(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Typed helpers on top of [`Store`].
pub trait StoreExt: Store {
    fn load_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.load(key)? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| StoreError::Decode {
                    key: key.to_string(),
                    source,
                }),
        }
    }

    fn save_as<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.save(key, value)
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

fn check_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        check_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Open (creating if needed) the store rooted at `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        check_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl Store for JsonDirStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            })
    }

    fn save(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let text = serde_json::to_string_pretty(&value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        // Write-then-rename so readers never see a half-written document.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &path)?;
        debug!(key, path = %path.display(), "saved");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// What happened to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Saved,
    Removed,
}

/// Published by [`ObservableStore`] after each successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub key: String,
    pub change: Change,
}

/// Handle returned by [`ObservableStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Wraps a store and notifies subscribers of every write.
pub struct ObservableStore<S> {
    inner: S,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl<S: Store> ObservableStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Register `listener`; it runs synchronously after each write.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn publish(&mut self, key: &str, change: Change) {
        let event = StoreEvent {
            key: key.to_string(),
            change,
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

impl<S: Store> Store for ObservableStore<S> {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.load(key)
    }

    fn save(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.inner.save(key, value)?;
        self.publish(key, Change::Saved);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)?;
        self.publish(key, Change::Removed);
        Ok(())
    }
}
