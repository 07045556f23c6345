use crate::default_entry::ShardingEntryOptions;
use crate::error::{Result, ShardingError};
use crate::options::AuthPermissionsOptions;
use crate::provider::{parse_database_type, StaticProviderName};
use tenantshard_models::DatabaseType;

/// Sharding settings read at start-up
#[derive(Debug, Clone)]
pub struct ShardingConfig {
    pub tenants_in_auth_pdb: bool,
    pub include_default_connection: Option<bool>,
    pub default_sharding_entry_name: Option<String>,
    pub database_type: DatabaseType,
    /// Short name reported for `DatabaseType::CustomDatabase`
    pub custom_provider_name: Option<String>,
}

impl Default for ShardingConfig {
    fn default() -> Self {
        Self {
            tenants_in_auth_pdb: true,
            include_default_connection: None,
            default_sharding_entry_name: Some("Default Database".to_string()),
            database_type: DatabaseType::NotSet,
            custom_provider_name: None,
        }
    }
}

impl ShardingConfig {
    /// Load configuration from environment variables
    ///
    /// - TENANTS_IN_AUTH_PDB: true/false (default true)
    /// - INCLUDE_DEFAULT_CONNECTION: optional true/false
    /// - DEFAULT_SHARDING_ENTRY_NAME (default "Default Database"; blank means none)
    /// - AUTHP_DATABASE_TYPE: NotSet, SqliteInMemory, SqlServer, PostgreSQL or CustomDatabase
    /// - CUSTOM_DATABASE_PROVIDER: short name for CustomDatabase
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let tenants_in_auth_pdb = match lookup("TENANTS_IN_AUTH_PDB") {
            Some(value) => parse_bool("TENANTS_IN_AUTH_PDB", &value)?,
            None => defaults.tenants_in_auth_pdb,
        };

        let include_default_connection = lookup("INCLUDE_DEFAULT_CONNECTION")
            .map(|value| parse_bool("INCLUDE_DEFAULT_CONNECTION", &value))
            .transpose()?;

        let database_type = match lookup("AUTHP_DATABASE_TYPE") {
            Some(value) => parse_database_type(&value)?,
            None => defaults.database_type,
        };

        Ok(Self {
            tenants_in_auth_pdb,
            include_default_connection,
            // Present but blank means no default name, not the built-in one
            default_sharding_entry_name: match lookup("DEFAULT_SHARDING_ENTRY_NAME") {
                Some(name) => Some(name).filter(|name| !name.trim().is_empty()),
                None => defaults.default_sharding_entry_name,
            },
            database_type,
            custom_provider_name: lookup("CUSTOM_DATABASE_PROVIDER").filter(|name| !name.trim().is_empty()),
        })
    }

    pub fn entry_options(&self) -> ShardingEntryOptions {
        ShardingEntryOptions::new(self.tenants_in_auth_pdb, self.include_default_connection)
    }

    pub fn global_options(&self) -> AuthPermissionsOptions {
        AuthPermissionsOptions::new(self.default_sharding_entry_name.clone(), self.database_type)
    }

    pub fn provider_name_source(&self) -> Option<StaticProviderName> {
        self.custom_provider_name.clone().map(StaticProviderName::new)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ShardingError::Configuration(format!(
            "{} must be true or false, got {}",
            key, value
        ))),
    }
}
