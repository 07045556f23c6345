use serde::{Deserialize, Serialize};
use tenantshard_models::DatabaseType;

/// Application-wide authorization options that the sharding setup reads from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthPermissionsOptions {
    /// Name given to the default sharding entry when the entry has none
    pub default_sharding_entry_name: Option<String>,
    pub internal_data: InternalData,
}

/// Values set by the setup code rather than by the application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InternalData {
    pub auth_p_database_type: DatabaseType,
}

impl AuthPermissionsOptions {
    pub fn new(default_sharding_entry_name: Option<String>, database_type: DatabaseType) -> Self {
        Self {
            default_sharding_entry_name,
            internal_data: InternalData {
                auth_p_database_type: database_type,
            },
        }
    }
}
