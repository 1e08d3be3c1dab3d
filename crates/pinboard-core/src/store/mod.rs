//! Local durable store: keyed textual slots with typed collection helpers.
//!
//! Four independent slots back local mode: the pins, users, and
//! notifications collections plus the active-session slot. Each slot holds
//! a JSON serialization of the corresponding records; an absent slot is
//! distinct from an empty collection so callers can seed defaults only on
//! first use.

pub mod file;

use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

pub use file::FileStore;

/// Slot key for the pins collection.
pub const PINS_KEY: &str = "pinboard_pins";
/// Slot key for the users collection (includes secrets, never synced).
pub const USERS_KEY: &str = "pinboard_users_db";
/// Slot key for the notifications collection.
pub const NOTIFICATIONS_KEY: &str = "pinboard_notifications";
/// Slot key for the active-session projection (at most one user).
pub const SESSION_KEY: &str = "pinboard_session";

/// Synchronous keyed persistence of textual slots.
///
/// Reads and writes are synchronous from the caller's perspective; a write
/// followed by a read of the same key returns the written value verbatim.
pub trait LocalStore: Send + Sync + 'static {
    /// Read a slot. `Ok(None)` means the slot has never been written.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write a slot, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot; removing an absent slot is a no-op.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Typed collection access over any [`LocalStore`].
pub trait StoreExt: LocalStore {
    /// Load a collection, distinguishing absent (`None`) from empty.
    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>> {
        match self.read(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Load a collection, treating an absent slot as empty.
    fn load_collection_or_default<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        Ok(self.load_collection(key)?.unwrap_or_default())
    }

    /// Persist a collection, preserving record and field order.
    fn save_collection<T: Serialize>(&self, key: &str, records: &[T]) -> Result<()> {
        self.write(key, &serde_json::to_string(records)?)
    }

    /// Load the single record held by a slot (the active session).
    fn load_slot<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Persist a single record into a slot.
    fn save_slot<T: Serialize>(&self, key: &str, record: &T) -> Result<()> {
        self.write(key, &serde_json::to_string(record)?)
    }
}

impl<S: LocalStore + ?Sized> StoreExt for S {}

/// In-memory store, primarily for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| Error::Store("store mutex poisoned".to_string()))?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| Error::Store("store mutex poisoned".to_string()))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| Error::Store("store mutex poisoned".to_string()))?;
        slots.remove(key);
        Ok(())
    }
}
