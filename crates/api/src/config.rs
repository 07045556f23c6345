use std::path::PathBuf;
use tenantshard_cache::CacheConfig;
use tenantshard_database::{ConnectionStrings, ShardingConfig, ShardingError};

/// Where sharding entries are kept
#[derive(Debug, Clone)]
pub enum StoreConfig {
    File(PathBuf),
    Redis(CacheConfig),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub sharding: ShardingConfig,
    pub store: StoreConfig,
    pub connection_strings: ConnectionStrings,
}

impl Config {
    pub fn from_env() -> Result<Self, ShardingError> {
        let store = match std::env::var("SHARDING_STORE")
            .unwrap_or_else(|_| "file".to_string())
            .to_lowercase()
            .as_str()
        {
            "file" => StoreConfig::File(
                std::env::var("SHARDING_FILE_PATH")
                    .unwrap_or_else(|_| "sharding-cache.json".to_string())
                    .into(),
            ),
            "redis" => StoreConfig::Redis(CacheConfig::from_env()),
            other => {
                return Err(ShardingError::Configuration(format!(
                    "SHARDING_STORE must be file or redis, got {}",
                    other
                )))
            }
        };

        Ok(Self {
            sharding: ShardingConfig::from_env()?,
            store,
            connection_strings: ConnectionStrings::from_env(),
        })
    }
}
