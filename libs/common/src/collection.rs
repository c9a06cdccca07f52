//! Typed record collections on top of a [`DocumentStore`]
//!
//! A [`Collection`] owns one named document and exposes it as a keyed set of
//! records. Every mutation is a full read-modify-write cycle performed while
//! holding the collection lock, so mutations made through the same
//! collection never overwrite each other.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::store::DocumentStore;

/// Records of one document keyed by numeric id
pub type Records<T> = BTreeMap<u64, T>;

/// Next id for a record set: highest existing id plus one, or 1 when empty
pub fn next_id<T>(records: &Records<T>) -> u64 {
    records.keys().next_back().map_or(1, |max| max + 1)
}

/// Typed access to one named document
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    name: String,
    lock: Arc<Mutex<()>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            name: self.name.clone(),
            lock: Arc::clone(&self.lock),
            _record: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn new(store: Arc<dyn DocumentStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            lock: Arc::new(Mutex::new(())),
            _record: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Load every record of the document
    pub async fn load(&self) -> StoreResult<Records<T>> {
        let document = self.store.read(&self.name).await?;
        serde_json::from_value(Value::Object(document)).map_err(|source| StoreError::Corrupt {
            name: self.name.clone(),
            source,
        })
    }

    async fn save(&self, records: &Records<T>) -> StoreResult<()> {
        let value = serde_json::to_value(records).map_err(|source| StoreError::Corrupt {
            name: self.name.clone(),
            source,
        })?;
        let document = into_document(&self.name, value)?;
        self.store.write(&self.name, &document).await
    }

    /// All records in ascending id order
    pub async fn list(&self) -> StoreResult<Vec<T>> {
        Ok(self.load().await?.into_values().collect())
    }

    pub async fn get(&self, id: u64) -> StoreResult<Option<T>> {
        Ok(self.load().await?.remove(&id))
    }

    /// Insert or replace the record stored under `id`
    pub async fn put(&self, id: u64, record: T) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        records.insert(id, record);
        self.save(&records).await
    }

    /// Insert a new record under the next free id. `build` receives the id.
    pub async fn insert_with<F>(&self, build: F) -> StoreResult<T>
    where
        F: FnOnce(u64) -> T,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let id = next_id(&records);
        let record = build(id);
        records.insert(id, record.clone());
        self.save(&records).await?;
        Ok(record)
    }

    /// Apply `apply` to the record stored under `id` and persist it.
    /// Returns `None` without writing when the record does not exist.
    pub async fn update_with<F>(&self, id: u64, apply: F) -> StoreResult<Option<T>>
    where
        F: FnOnce(&mut T),
    {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let Some(record) = records.get_mut(&id) else {
            return Ok(None);
        };
        apply(record);
        let updated = record.clone();
        self.save(&records).await?;
        Ok(Some(updated))
    }

    /// Run `change` over the loaded records while holding the lock. The
    /// records are persisted when it returns `Ok`; an `Err` writes nothing.
    pub async fn modify<R, E, F>(&self, change: F) -> Result<R, E>
    where
        F: FnOnce(&mut Records<T>) -> Result<R, E>,
        E: From<StoreError>,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let outcome = change(&mut records)?;
        self.save(&records).await?;
        Ok(outcome)
    }

    /// Remove the record stored under `id`. Returns whether it existed.
    pub async fn delete(&self, id: u64) -> StoreResult<bool> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        if records.remove(&id).is_none() {
            return Ok(false);
        }
        self.save(&records).await?;
        Ok(true)
    }
}

/// A record set must serialize to a JSON object; anything else is refused
/// rather than written over the document.
fn into_document(name: &str, value: Value) -> StoreResult<Map<String, Value>> {
    match value {
        Value::Object(document) => Ok(document),
        other => Err(StoreError::Corrupt {
            name: name.to_string(),
            source: serde_json::Error::custom(format!(
                "records serialized to {other} instead of an object"
            )),
        }),
    }
}
