pub mod error;
pub mod file_store;
pub mod redis_cache;
pub mod store;

pub use error::{CacheError, Result};
pub use file_store::FileShardingStore;
pub use redis_cache::{Cache, CacheConfig, RedisShardingStore};
pub use store::{seed_default_entry, sharding_entry_key, ShardingEntryStore, SHARDING_ENTRY_PREFIX};
