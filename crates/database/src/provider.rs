//! Database provider short names.
//!
//! Every sharding entry records the short name of the provider serving it.
//! The built-in backends map to fixed names; a custom backend asks a
//! [`ProviderNameSource`] for the name its own provider registers.

use crate::error::{Result, ShardingError};
use tenantshard_models::DatabaseType;

pub const SQLITE: &str = "Sqlite";
pub const SQL_SERVER: &str = "SqlServer";
pub const POSTGRESQL: &str = "PostgreSQL";

/// Reports the short name of a custom database provider
pub trait ProviderNameSource: Send + Sync {
    fn provider_short_name(&self) -> anyhow::Result<String>;
}

impl<F> ProviderNameSource for F
where
    F: Fn() -> anyhow::Result<String> + Send + Sync,
{
    fn provider_short_name(&self) -> anyhow::Result<String> {
        self()
    }
}

/// Provider name source that returns a fixed, configured name
#[derive(Debug, Clone)]
pub struct StaticProviderName(String);

impl StaticProviderName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl ProviderNameSource for StaticProviderName {
    fn provider_short_name(&self) -> anyhow::Result<String> {
        if self.0.trim().is_empty() {
            anyhow::bail!("custom database provider name is empty");
        }
        Ok(self.0.clone())
    }
}

/// Map the configured backend to its provider short name
pub fn provider_short_name(
    database_type: DatabaseType,
    source: Option<&dyn ProviderNameSource>,
) -> Result<String> {
    match database_type {
        DatabaseType::NotSet => Err(ShardingError::ProviderNotSet),
        DatabaseType::SqliteInMemory => Ok(SQLITE.to_string()),
        DatabaseType::SqlServer => Ok(SQL_SERVER.to_string()),
        DatabaseType::PostgreSql => Ok(POSTGRESQL.to_string()),
        DatabaseType::CustomDatabase => {
            let source = source.ok_or(ShardingError::MissingProviderNameSource)?;
            source
                .provider_short_name()
                .map_err(ShardingError::ProviderLookup)
        }
    }
}

/// Parse a configured backend name, failing loudly on anything unknown
pub fn parse_database_type(value: &str) -> Result<DatabaseType> {
    value
        .parse()
        .map_err(|_| ShardingError::UnrecognizedProvider(value.to_string()))
}
