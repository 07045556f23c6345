use crate::error::Result;
use async_trait::async_trait;
use tenantshard_models::ShardingEntry;

/// Key prefix of sharding entries in a shared cache
pub const SHARDING_ENTRY_PREFIX: &str = "ShardingEntry-";

pub fn sharding_entry_key(name: &str) -> String {
    format!("{}{}", SHARDING_ENTRY_PREFIX, name)
}

/// Persistent store of sharding entries, keyed by entry name
#[async_trait]
pub trait ShardingEntryStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<ShardingEntry>>;

    /// All entries, sorted by name
    async fn get_all(&self) -> Result<Vec<ShardingEntry>>;

    /// Insert or replace the entry with the same name
    async fn set(&self, entry: &ShardingEntry) -> Result<()>;

    /// Returns false if there was no such entry
    async fn remove(&self, name: &str) -> Result<bool>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.get_all().await?.is_empty())
    }

    /// Write the entry only if the store holds no entries, as one atomic step.
    ///
    /// Returns true if the entry was written.
    async fn set_if_empty(&self, entry: &ShardingEntry) -> Result<bool>;
}

/// Write the default sharding entry, but only into an empty store.
///
/// Returns true if the entry was written.
pub async fn seed_default_entry<S>(store: &S, entry: Option<&ShardingEntry>) -> Result<bool>
where
    S: ShardingEntryStore + ?Sized,
{
    let Some(entry) = entry else {
        tracing::debug!("No default sharding entry to seed");
        return Ok(false);
    };

    if !store.set_if_empty(entry).await? {
        tracing::debug!(entry = %entry.name, "Sharding store already has entries, not seeding");
        return Ok(false);
    }

    tracing::info!(entry = %entry.name, "Seeded default sharding entry");
    Ok(true)
}
