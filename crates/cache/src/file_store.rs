//! File-backed sharding-entry store
//!
//! All values live in one JSON file: an object mapping cache keys to
//! JSON-encoded values. Keys without the sharding-entry prefix belong to
//! other users of the file and are preserved untouched.

use crate::error::Result;
use crate::store::{sharding_entry_key, ShardingEntryStore, SHARDING_ENTRY_PREFIX};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tenantshard_models::ShardingEntry;
use tokio::sync::Mutex;

type CacheFile = BTreeMap<String, String>;

pub struct FileShardingStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileShardingStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<CacheFile> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(CacheFile::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CacheFile::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, values: &CacheFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let serialized = serde_json::to_vec_pretty(values)?;
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, serialized).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ShardingEntryStore for FileShardingStore {
    async fn get(&self, name: &str) -> Result<Option<ShardingEntry>> {
        let _guard = self.lock.lock().await;
        let values = self.load().await?;

        match values.get(&sharding_entry_key(name)) {
            Some(value) => Ok(Some(serde_json::from_str(value)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<ShardingEntry>> {
        let _guard = self.lock.lock().await;
        let values = self.load().await?;

        let mut entries = values
            .iter()
            .filter(|(key, _)| key.starts_with(SHARDING_ENTRY_PREFIX))
            .map(|(_, value)| serde_json::from_str::<ShardingEntry>(value))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(entries)
    }

    async fn set(&self, entry: &ShardingEntry) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut values = self.load().await?;

        values.insert(sharding_entry_key(&entry.name), serde_json::to_string(entry)?);
        self.save(&values).await?;

        tracing::debug!(entry = %entry.name, path = %self.path.display(), "Stored sharding entry");
        Ok(())
    }

    async fn set_if_empty(&self, entry: &ShardingEntry) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut values = self.load().await?;

        if values.keys().any(|key| key.starts_with(SHARDING_ENTRY_PREFIX)) {
            return Ok(false);
        }

        values.insert(sharding_entry_key(&entry.name), serde_json::to_string(entry)?);
        self.save(&values).await?;
        Ok(true)
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut values = self.load().await?;

        if values.remove(&sharding_entry_key(name)).is_none() {
            return Ok(false);
        }
        self.save(&values).await?;

        tracing::debug!(entry = %name, path = %self.path.display(), "Removed sharding entry");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed_default_entry;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileShardingStore {
        FileShardingStore::new(dir.path().join("cache").join("sharding.json"))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert!(store.is_empty().await.unwrap());
        assert_eq!(store.get("Default Database").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let entry = ShardingEntry::new("Shard 1", "Shard1", "PostgreSQL").with_database_name("tenants1");

        store.set(&entry).await.unwrap();
        assert_eq!(store.get("Shard 1").await.unwrap(), Some(entry.clone()));

        let updated = ShardingEntry::new("Shard 1", "Shard1", "SqlServer");
        store.set(&updated).await.unwrap();
        assert_eq!(store.get_all().await.unwrap(), vec![updated]);

        assert!(store.remove("Shard 1").await.unwrap());
        assert!(!store.remove("Shard 1").await.unwrap());
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_get_all_sorted_and_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sharding.json");

        let store = FileShardingStore::new(&path);
        store.set(&ShardingEntry::new("b", "Shard2", "Sqlite")).await.unwrap();
        store.set(&ShardingEntry::new("a", "Shard1", "Sqlite")).await.unwrap();

        let reopened = FileShardingStore::new(&path);
        let names: Vec<String> = reopened
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_foreign_keys_are_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sharding.json");
        std::fs::write(&path, r#"{"Tenant-42":"\"kept\""}"#).unwrap();

        let store = FileShardingStore::new(&path);
        assert!(store.is_empty().await.unwrap());

        store.set(&ShardingEntry::new("a", "Shard1", "Sqlite")).await.unwrap();

        let raw: CacheFile = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw.get("Tenant-42").map(String::as_str), Some("\"kept\""));
        assert!(raw.contains_key("ShardingEntry-a"));
    }

    #[tokio::test]
    async fn test_seed_only_into_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let default = ShardingEntry::new("Default Database", "DefaultConnection", "SqlServer");

        assert!(!seed_default_entry(&store, None).await.unwrap());
        assert!(store.is_empty().await.unwrap());

        assert!(seed_default_entry(&store, Some(&default)).await.unwrap());
        assert_eq!(store.get_all().await.unwrap(), vec![default.clone()]);

        let other = ShardingEntry::new("Other", "DefaultConnection", "Sqlite");
        assert!(!seed_default_entry(&store, Some(&other)).await.unwrap());
        assert_eq!(store.get_all().await.unwrap(), vec![default]);
    }

    #[tokio::test]
    async fn test_concurrent_seeding_writes_one_entry() {
        for _ in 0..50 {
            let dir = TempDir::new().unwrap();
            let store = std::sync::Arc::new(store(&dir));

            let tasks: Vec<_> = (0..4)
                .map(|n| {
                    let store = store.clone();
                    tokio::spawn(async move {
                        let entry = ShardingEntry::new(format!("Default {}", n), "DefaultConnection", "SqlServer");
                        seed_default_entry(&*store, Some(&entry)).await.unwrap()
                    })
                })
                .collect();

            let mut written = 0;
            for task in tasks {
                if task.await.unwrap() {
                    written += 1;
                }
            }

            assert_eq!(written, 1);
            assert_eq!(store.get_all().await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_set_if_empty_ignores_foreign_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sharding.json");
        std::fs::write(&path, r#"{"Tenant-42":"\"kept\""}"#).unwrap();

        let store = FileShardingStore::new(&path);
        let entry = ShardingEntry::new("Default Database", "DefaultConnection", "Sqlite");
        assert!(store.set_if_empty(&entry).await.unwrap());
        assert!(!store.set_if_empty(&ShardingEntry::new("Other", "DefaultConnection", "Sqlite")).await.unwrap());
        assert_eq!(store.get_all().await.unwrap(), vec![entry]);
    }

    #[tokio::test]
    async fn test_seed_skips_non_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let existing = ShardingEntry::new("Shard 1", "Shard1", "PostgreSQL");
        store.set(&existing).await.unwrap();

        let default = ShardingEntry::new("Default Database", "DefaultConnection", "PostgreSQL");
        assert!(!seed_default_entry(&store, Some(&default)).await.unwrap());
        assert_eq!(store.get("Default Database").await.unwrap(), None);
    }
}
