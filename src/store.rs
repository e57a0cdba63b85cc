//! Location stores
//!
//! The resolver reads a snapshot of previously resolved locations and writes
//! newly geocoded ones back. Reads race with writes at worst into a missed
//! cache hit.

use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::Keyspace;
use std::path::Path;
use tokio::sync::{Mutex, RwLock};
use tokio::task;

use crate::models::StoredLocation;

const NAME_INDEX_KEY: &str = "index:names";

/// Storage collaborator for resolved locations
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Case-insensitive lookup by name
    async fn find_exact(&self, name: &str) -> Result<Option<StoredLocation>>;

    /// Snapshot of all stored names
    async fn names(&self) -> Result<Vec<String>>;

    /// Insert or replace the record for `location.name`
    async fn insert(&self, location: StoredLocation) -> Result<()>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryLocationStore {
    locations: RwLock<Vec<StoredLocation>>,
}

impl MemoryLocationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_locations(locations: Vec<StoredLocation>) -> Self {
        Self {
            locations: RwLock::new(locations),
        }
    }
}

#[async_trait]
impl LocationStore for MemoryLocationStore {
    async fn find_exact(&self, name: &str) -> Result<Option<StoredLocation>> {
        let key = StoredLocation::key(name);
        let locations = self.locations.read().await;
        Ok(locations
            .iter()
            .find(|location| StoredLocation::key(&location.name) == key)
            .cloned())
    }

    async fn names(&self) -> Result<Vec<String>> {
        let locations = self.locations.read().await;
        Ok(locations.iter().map(|location| location.name.clone()).collect())
    }

    async fn insert(&self, location: StoredLocation) -> Result<()> {
        let key = StoredLocation::key(&location.name);
        let mut locations = self.locations.write().await;
        locations.retain(|existing| StoredLocation::key(&existing.name) != key);
        locations.push(location);
        Ok(())
    }
}

/// On-disk store backed by a fjall keyspace, records encoded with postcard
pub struct PersistentLocationStore {
    store: Keyspace,
    // serializes read-modify-write of the name index
    index_lock: Mutex<()>,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl PersistentLocationStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = fjall::Database::builder(path)
            .open()
            .with_context(|| format!("Failed to open location store at {}", path.display()))?;
        let items = db.keyspace("locations", fjall::KeyspaceCreateOptions::default)?;
        Ok(Self {
            store: items,
            index_lock: Mutex::new(()),
        })
    }

    async fn read<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        maybe_bytes
            .map(|bytes| postcard::from_bytes(&bytes).context("Corrupt location store entry"))
            .transpose()
    }

    async fn write<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let bytes = postcard::to_stdvec(value)?;
        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }
}

#[async_trait]
impl LocationStore for PersistentLocationStore {
    #[tracing::instrument(name = "store_find_exact", level = "debug", skip(self))]
    async fn find_exact(&self, name: &str) -> Result<Option<StoredLocation>> {
        let found = self.read(&StoredLocation::key(name)).await?;
        tracing::debug!(hit = found.is_some(), "Exact lookup finished");
        Ok(found)
    }

    async fn names(&self) -> Result<Vec<String>> {
        Ok(self.read(NAME_INDEX_KEY).await?.unwrap_or_default())
    }

    #[tracing::instrument(name = "store_insert", level = "debug", skip(self, location), fields(name = %location.name))]
    async fn insert(&self, location: StoredLocation) -> Result<()> {
        let _guard = self.index_lock.lock().await;

        self.write(&StoredLocation::key(&location.name), &location)
            .await?;

        let mut names: Vec<String> = self.read(NAME_INDEX_KEY).await?.unwrap_or_default();
        let key = StoredLocation::key(&location.name);
        names.retain(|existing| StoredLocation::key(existing) != key);
        names.push(location.name);
        self.write(NAME_INDEX_KEY, &names).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn paris() -> StoredLocation {
        StoredLocation::new(
            "Paris".to_string(),
            "Paris, Île-de-France, France".to_string(),
            Coordinate::new(48.8589, 2.32).unwrap(),
            "France".to_string(),
        )
    }

    #[tokio::test]
    async fn test_memory_store_exact_is_case_insensitive() {
        let store = MemoryLocationStore::with_locations(vec![paris()]);
        let found = store.find_exact("pARIS").await.unwrap();
        assert_eq!(found.map(|l| l.name), Some("Paris".to_string()));
        assert!(store.find_exact("Lyon").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_insert_replaces_same_name() {
        let store = MemoryLocationStore::new();
        store.insert(paris()).await.unwrap();
        let mut again = paris();
        again.name = "PARIS".to_string();
        store.insert(again).await.unwrap();
        assert_eq!(store.names().await.unwrap(), vec!["PARIS".to_string()]);
    }

    #[tokio::test]
    async fn test_persistent_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistentLocationStore::open(dir.path()).unwrap();

        assert!(store.names().await.unwrap().is_empty());
        store.insert(paris()).await.unwrap();

        let found = store.find_exact("paris").await.unwrap().unwrap();
        assert_eq!(found.display_name, "Paris, Île-de-France, France");
        assert_eq!(found.coordinate, Coordinate::new(48.8589, 2.32).unwrap());
        assert_eq!(store.names().await.unwrap(), vec!["Paris".to_string()]);
    }
}
