use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;

/// Generic JSON file-backed key-value map store.
///
/// Persists a `HashMap<K, V>` to a JSON file. Every mutation holds the write
/// lock until the file has been replaced, so readers never observe a state
/// that was not persisted and concurrent writers are serialized.
pub struct JsonMapStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ServiceError::Db(format!("{} is not a valid document file: {e}", file_path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: HashMap<K, V> = HashMap::new();
                write_atomic(&file_path, &empty).await?;
                empty
            }
            Err(e) => return Err(ServiceError::Db(e.to_string())),
        };

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    /// List all values.
    pub async fn values(&self) -> Vec<V> {
        let map = self.inner.read().await;
        map.values().cloned().collect()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Insert or update a value by key and persist.
    pub async fn insert(&self, key: K, value: V) -> Result<(), ServiceError> {
        self.update_map(|m| {
            m.insert(key, value);
            Ok(())
        })
        .await
    }

    /// Remove a key and persist; returns the removed value.
    pub async fn remove(&self, key: &K) -> Result<Option<V>, ServiceError> {
        self.update_map(|m| Ok(m.remove(key))).await
    }

    /// Apply a mutation to the map and persist it before releasing the lock.
    ///
    /// If `f` or the write fails, the in-memory map is rolled back and nothing
    /// is persisted.
    pub async fn update_map<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<R, ServiceError>,
    {
        let mut map = self.inner.write().await;
        let snapshot = map.clone();
        let out = match f(&mut map) {
            Ok(out) => out,
            Err(e) => {
                *map = snapshot;
                return Err(e);
            }
        };
        if let Err(e) = write_atomic(&self.file_path, &*map).await {
            *map = snapshot;
            return Err(e);
        }
        Ok(out)
    }
}

async fn write_atomic<T: serde::Serialize>(path: &PathBuf, value: &T) -> Result<(), ServiceError> {
    let data = serde_json::to_vec(value).map_err(|e| ServiceError::Db(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    fs::rename(&tmp, path).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn json_map_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        assert_eq!(store.len().await, 0);

        store.insert("a".into(), "1".into()).await?;
        store.insert("b".into(), "2".into()).await?;
        assert_eq!(store.get(&"a".into()).await.as_deref(), Some("1"));

        let old = store
            .update_map(|m| Ok(m.insert("a".to_string(), "10".into())))
            .await?;
        assert_eq!(old.as_deref(), Some("1"));

        let removed = store.remove(&"b".into()).await?;
        assert_eq!(removed.as_deref(), Some("2"));
        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(reloaded.len().await, 1);
        assert_eq!(reloaded.get(&"a".into()).await.as_deref(), Some("10"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_writes_nothing() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonMapStore::<String, u64>::new(&tmp).await?;
        store.insert("n".into(), 1).await?;

        let res: Result<(), _> = store
            .update_map(|m| {
                m.insert("n".into(), 99);
                Err(ServiceError::Validation("nope".into()))
            })
            .await;
        assert!(res.is_err());
        assert_eq!(store.get(&"n".into()).await, Some(1));
        let reloaded = JsonMapStore::<String, u64>::new(&tmp).await?;
        assert_eq!(reloaded.get(&"n".into()).await, Some(1));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, b"{not json").await?;
        assert!(JsonMapStore::<String, String>::new(&tmp).await.is_err());
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
