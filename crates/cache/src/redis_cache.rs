use crate::error::Result;
use crate::store::{sharding_entry_key, ShardingEntryStore, SHARDING_ENTRY_PREFIX};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use tenantshard_models::ShardingEntry;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub url: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL").unwrap_or_else(|_| Self::default().url),
        }
    }
}

#[derive(Clone)]
pub struct Cache {
    manager: ConnectionManager,
}

impl Cache {
    pub async fn new(config: CacheConfig) -> Result<Self> {
        let client = Client::open(config.url)?;
        let manager = ConnectionManager::new(client).await?;

        Ok(Self { manager })
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let serialized = serde_json::to_string(value)?;
        let mut conn = self.manager.clone();
        conn.set::<_, _, ()>(key, serialized).await?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    /// Returns the number of keys removed
    pub async fn delete(&self, key: &str) -> Result<u64> {
        let mut conn = self.manager.clone();
        let removed: u64 = conn.del(key).await?;
        Ok(removed)
    }

    /// Keys matching a glob pattern, walked with SCAN
    pub async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.manager.clone();
        let mut iter: redis::AsyncIter<String> = conn.scan_match(pattern).await?;

        let mut keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }

        Ok(keys)
    }

    /// SET key value NX PX ttl; returns true if the key was set
    pub async fn set_nx_px(&self, key: &str, value: &str, ttl_ms: u64) -> Result<bool> {
        let mut conn = self.manager.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    /// Get multiple values at once
    pub async fn mget<T: DeserializeOwned>(&self, keys: &[String]) -> Result<Vec<Option<T>>> {
        if keys.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.manager.clone();
        // MGET always answers with an array, even for a single key
        let values: Vec<Option<String>> = redis::cmd("MGET").arg(keys).query_async(&mut conn).await?;

        let mut results = Vec::with_capacity(values.len());
        for value in values {
            match value {
                Some(s) => results.push(Some(serde_json::from_str(&s)?)),
                None => results.push(None),
            }
        }

        Ok(results)
    }

    /// Ping Redis to check connection
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        redis::cmd("PING").query_async::<()>(&mut conn).await?;
        Ok(())
    }
}

// Outside the entry prefix so it never shows up as an entry
const SEED_LOCK_KEY: &str = "ShardingSeedLock";
const SEED_LOCK_TTL_MS: u64 = 10_000;

/// Sharding-entry store shared through Redis
#[derive(Clone)]
pub struct RedisShardingStore {
    cache: Cache,
}

impl RedisShardingStore {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl ShardingEntryStore for RedisShardingStore {
    async fn get(&self, name: &str) -> Result<Option<ShardingEntry>> {
        self.cache.get(&sharding_entry_key(name)).await
    }

    async fn get_all(&self) -> Result<Vec<ShardingEntry>> {
        let keys = self.cache.scan_keys(&format!("{}*", SHARDING_ENTRY_PREFIX)).await?;

        // A key can expire or be removed between SCAN and MGET
        let mut entries: Vec<ShardingEntry> = self
            .cache
            .mget::<ShardingEntry>(&keys)
            .await?
            .into_iter()
            .flatten()
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(entries)
    }

    async fn set(&self, entry: &ShardingEntry) -> Result<()> {
        self.cache.set(&sharding_entry_key(&entry.name), entry).await
    }

    async fn set_if_empty(&self, entry: &ShardingEntry) -> Result<bool> {
        // Seeders racing on another process lose here; the lock holder writes
        if !self.cache.set_nx_px(SEED_LOCK_KEY, &entry.name, SEED_LOCK_TTL_MS).await? {
            tracing::debug!(entry = %entry.name, "Another process is seeding the sharding store");
            return Ok(false);
        }

        let written = match self.is_empty().await {
            Ok(true) => self.set(entry).await.map(|_| true),
            Ok(false) => Ok(false),
            Err(e) => Err(e),
        };

        self.cache.delete(SEED_LOCK_KEY).await?;
        written
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        Ok(self.cache.delete(&sharding_entry_key(name)).await? > 0)
    }
}
