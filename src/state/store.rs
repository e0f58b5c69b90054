//! Persisted user and time slot collections.
//!
//! Each collection lives as a JSON array under `<namespace>_<collection>` in a
//! [`KeyValueStorage`]. Every mutation reads the current array, changes it and
//! writes it back immediately. Nothing coordinates two processes writing the
//! same state directory, the last write wins.

use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::storage::{KeyValueStorage, SharedStorage};
use crate::error::{ConsoleError, Result};
use crate::models::{Record, TimeSlot, User};

pub const DEFAULT_NAMESPACE: &str = "tss";

/// Owner of the persisted collections and their cross references
pub struct Store {
    storage: SharedStorage,
    namespace: String,
}

impl Store {
    pub fn new(storage: SharedStorage) -> Self {
        Self::with_namespace(storage, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(storage: SharedStorage, namespace: &str) -> Self {
        Self {
            storage,
            namespace: namespace.to_string(),
        }
    }

    /// Full storage key for a name inside this store's namespace
    pub fn namespaced_key(&self, name: &str) -> String {
        format!("{}_{}", self.namespace, name)
    }

    pub fn storage(&self) -> &dyn KeyValueStorage {
        self.storage.as_ref()
    }

    /// All records of a collection, seeding it on first access
    pub fn get_all<R: Record>(&self) -> Result<Vec<R>> {
        let key = self.namespaced_key(R::COLLECTION.key());

        match self.storage.get(&key)? {
            Some(content) if !content.is_empty() => {
                let records: Vec<R> = serde_json::from_str(&content)
                    .map_err(|e| ConsoleError::CorruptData { key: key.clone(), source: e })?;
                debug!("Read {} records from {}", records.len(), key);
                Ok(records)
            }
            _ => {
                let seed = R::seed();
                self.write(&key, &seed)?;
                info!("Seeded {} with {} records", key, seed.len());
                Ok(seed)
            }
        }
    }

    /// Overwrite a whole collection
    pub fn set_all<R: Record>(&self, records: &[R]) -> Result<()> {
        let key = self.namespaced_key(R::COLLECTION.key());
        self.write(&key, records)
    }

    /// Append a record. Ids must be unique within the collection.
    pub fn add<R: Record>(&self, record: R) -> Result<()> {
        let mut records = self.get_all::<R>()?;

        if records.iter().any(|r| r.id() == record.id()) {
            return Err(ConsoleError::DuplicateId {
                collection: R::COLLECTION.to_string(),
                id: record.id().to_string(),
            });
        }

        debug!("Adding {} {}", R::COLLECTION, record.id());
        records.push(record);
        self.set_all(&records)
    }

    /// Shallow-merge `patch` over the record with `id`.
    ///
    /// Keys present in the patch replace the stored ones, a `null` clears an
    /// optional field. Returns `false` without writing when no record matches.
    pub fn update<R: Record>(&self, id: &str, patch: &impl Serialize) -> Result<bool> {
        let patch = match serde_json::to_value(patch)? {
            Value::Object(map) => map,
            other => {
                return Err(ConsoleError::InvalidPatch {
                    collection: R::COLLECTION.to_string(),
                    message: format!("expected an object, got {}", other),
                })
            }
        };

        if let Some(new_id) = patch.get("id") {
            if new_id.as_str() != Some(id) {
                return Err(ConsoleError::InvalidPatch {
                    collection: R::COLLECTION.to_string(),
                    message: "record ids cannot change".to_string(),
                });
            }
        }

        let mut records = self.get_all::<R>()?;
        let Some(idx) = records.iter().position(|r| r.id() == id) else {
            debug!("No {} with id {} to update", R::COLLECTION, id);
            return Ok(false);
        };

        let mut merged = serde_json::to_value(&records[idx])?;
        if let Value::Object(fields) = &mut merged {
            fields.extend(patch.clone());
        }

        let updated: R = serde_json::from_value(merged).map_err(|e| ConsoleError::InvalidPatch {
            collection: R::COLLECTION.to_string(),
            message: e.to_string(),
        })?;
        check_patch_applied(&records[idx], &updated, &patch)?;

        records[idx] = updated;
        self.set_all(&records)?;
        Ok(true)
    }

    fn write<R: Serialize>(&self, key: &str, records: &[R]) -> Result<()> {
        let content = serde_json::to_string(records)?;
        self.storage.set(key, &content)?;
        debug!("Wrote {} records to {}", records.len(), key);
        Ok(())
    }

    pub fn users(&self) -> Result<Vec<User>> {
        self.get_all()
    }

    pub fn set_users(&self, users: &[User]) -> Result<()> {
        self.set_all(users)
    }

    pub fn find_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users()?.into_iter().find(|u| u.id == id))
    }

    pub fn add_user(&self, user: User) -> Result<()> {
        self.add(user)
    }

    pub fn update_user(&self, id: &str, patch: &impl Serialize) -> Result<bool> {
        self.update::<User>(id, patch)
    }

    /// Delete a user and clear any slot that names them as teacher.
    ///
    /// Both collections are read before anything is written, so unreadable
    /// slots leave the users untouched.
    pub fn delete_user(&self, id: &str) -> Result<bool> {
        let mut users = self.users()?;
        let mut slots = self.slots()?;

        let before = users.len();
        users.retain(|u| u.id != id);
        let removed = users.len() != before;
        let cleared = slots.iter_mut().map(|s| s.clear_teacher(id)).filter(|&c| c).count();

        if removed {
            self.set_users(&users)?;
            info!("Deleted user {}", id);
        } else {
            debug!("No user with id {} to delete", id);
        }
        if cleared > 0 {
            self.set_slots(&slots)?;
            info!("Cleared teacher {} from {} slots", id, cleared);
        }

        Ok(removed)
    }

    pub fn slots(&self) -> Result<Vec<TimeSlot>> {
        self.get_all()
    }

    pub fn set_slots(&self, slots: &[TimeSlot]) -> Result<()> {
        self.set_all(slots)
    }

    pub fn find_slot(&self, id: &str) -> Result<Option<TimeSlot>> {
        Ok(self.slots()?.into_iter().find(|s| s.id == id))
    }

    pub fn add_slot(&self, slot: TimeSlot) -> Result<()> {
        self.add(slot)
    }

    pub fn update_slot(&self, id: &str, patch: &impl Serialize) -> Result<bool> {
        self.update::<TimeSlot>(id, patch)
    }

    /// Delete a slot and clear assigned/preferred references to it.
    ///
    /// Both collections are read before anything is written.
    pub fn delete_slot(&self, id: &str) -> Result<bool> {
        let mut slots = self.slots()?;
        let mut users = self.users()?;

        let before = slots.len();
        slots.retain(|s| s.id != id);
        let removed = slots.len() != before;
        let cleared = users.iter_mut().map(|u| u.clear_time_slot(id)).filter(|&c| c).count();

        if removed {
            self.set_slots(&slots)?;
            info!("Deleted time slot {}", id);
        } else {
            debug!("No time slot with id {} to delete", id);
        }
        if cleared > 0 {
            self.set_users(&users)?;
            info!("Cleared slot {} from {} users", id, cleared);
        }

        Ok(removed)
    }
}

/// Make sure every key of `patch` landed in `updated` with the patched value.
///
/// Catches keys the record type does not declare and values that change
/// shape on the way through the typed record. Unknown fields already kept on
/// the stored record may still be updated.
fn check_patch_applied<R: Record>(
    original: &R,
    updated: &R,
    patch: &Map<String, Value>,
) -> Result<()> {
    let written = serde_json::to_value(updated)?;

    for (key, value) in patch {
        if updated.extra().contains_key(key) && !original.extra().contains_key(key) {
            return Err(ConsoleError::InvalidPatch {
                collection: R::COLLECTION.to_string(),
                message: format!("unknown field '{}'", key),
            });
        }

        let applied = match (value, written.get(key)) {
            (Value::Null, None) => true,
            (value, Some(stored)) => value == stored,
            (_, None) => false,
        };
        if !applied {
            return Err(ConsoleError::InvalidPatch {
                collection: R::COLLECTION.to_string(),
                message: format!("field '{}' was not applied as given", key),
            });
        }
    }

    Ok(())
}

/// Shared store type
pub type SharedStore = Arc<Store>;

pub fn create_shared_store(storage: SharedStorage, namespace: &str) -> SharedStore {
    Arc::new(Store::with_namespace(storage, namespace))
}
