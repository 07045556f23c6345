//! Default sharding entry resolution
//!
//! When tenants may live in the same database as the authorization data, the
//! sharding-entry store needs one entry describing that database. This
//! module decides whether that entry exists and fills in whatever fields the
//! application left unset:
//!
//! - `name` falls back to the global default sharding entry name
//! - `connection_name` falls back to `"DefaultConnection"`
//! - `database_type` falls back to the configured backend's short name

use crate::error::{Result, ShardingError};
use crate::options::AuthPermissionsOptions;
use crate::provider::{provider_short_name, ProviderNameSource};
use tenantshard_models::ShardingEntry;
use validator::Validate;

pub const DEFAULT_CONNECTION_NAME: &str = "DefaultConnection";

/// Start-up options describing the default sharding entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardingEntryOptions {
    tenants_in_auth_pdb: bool,
    /// Drop `default_connection_name` from the eligible connection names when others exist
    pub remove_default_connection_if_others: bool,
    pub default_connection_name: String,

    pub name: Option<String>,
    pub connection_name: Option<String>,
    pub database_type: Option<String>,
}

impl ShardingEntryOptions {
    /// `include_default_connection` overrides the default derived from `tenants_in_auth_pdb`
    pub fn new(tenants_in_auth_pdb: bool, include_default_connection: Option<bool>) -> Self {
        let remove_default_connection_if_others = match include_default_connection {
            Some(include) => !include,
            None => !tenants_in_auth_pdb,
        };

        Self {
            tenants_in_auth_pdb,
            remove_default_connection_if_others,
            default_connection_name: DEFAULT_CONNECTION_NAME.to_string(),
            name: None,
            connection_name: None,
            database_type: None,
        }
    }

    pub fn tenants_in_auth_pdb(&self) -> bool {
        self.tenants_in_auth_pdb
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_connection_name(mut self, connection_name: impl Into<String>) -> Self {
        self.connection_name = Some(connection_name.into());
        self
    }

    pub fn with_database_type(mut self, database_type: impl Into<String>) -> Self {
        self.database_type = Some(database_type.into());
        self
    }

    /// Resolve the default sharding entry.
    ///
    /// Returns `Ok(None)` when tenants must each have their own database, so
    /// no shared entry belongs in the authorization database. Otherwise every
    /// field is taken from these options when set, else from its default.
    /// `source` is only consulted for a custom database backend.
    pub fn provide_default_sharding_entry(
        &self,
        global_options: &AuthPermissionsOptions,
        source: Option<&dyn ProviderNameSource>,
    ) -> Result<Option<ShardingEntry>> {
        if !self.tenants_in_auth_pdb {
            tracing::debug!("Tenants have their own databases, no default sharding entry");
            return Ok(None);
        }

        let name = non_blank(&self.name)
            .or_else(|| non_blank(&global_options.default_sharding_entry_name))
            .ok_or(ShardingError::MissingEntryName)?;

        let connection_name = self
            .connection_name
            .clone()
            .unwrap_or_else(|| DEFAULT_CONNECTION_NAME.to_string());

        let database_type = match &self.database_type {
            Some(database_type) => database_type.clone(),
            None => provider_short_name(global_options.internal_data.auth_p_database_type, source)?,
        };

        let entry = ShardingEntry::new(name, connection_name, database_type);
        entry
            .validate()
            .map_err(|e| ShardingError::InvalidEntry(e.to_string()))?;

        tracing::debug!(
            entry = %entry.name,
            connection = %entry.connection_name,
            database_type = %entry.database_type,
            "Resolved default sharding entry"
        );

        Ok(Some(entry))
    }

    /// Same as [`Self::provide_default_sharding_entry`], but also writes the
    /// resolved values back into any unset fields of these options.
    pub fn resolve_in_place(
        &mut self,
        global_options: &AuthPermissionsOptions,
        source: Option<&dyn ProviderNameSource>,
    ) -> Result<Option<ShardingEntry>> {
        let entry = self.provide_default_sharding_entry(global_options, source)?;

        if let Some(entry) = &entry {
            self.name.get_or_insert_with(|| entry.name.clone());
            self.connection_name
                .get_or_insert_with(|| entry.connection_name.clone());
            self.database_type
                .get_or_insert_with(|| entry.database_type.clone());
        }

        Ok(entry)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

impl Default for ShardingEntryOptions {
    fn default() -> Self {
        Self::new(true, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProviderName;
    use tenantshard_models::DatabaseType;

    fn global(name: Option<&str>, database_type: DatabaseType) -> AuthPermissionsOptions {
        AuthPermissionsOptions::new(name.map(str::to_string), database_type)
    }

    #[test]
    fn test_no_entry_when_tenants_have_own_databases() {
        let options = ShardingEntryOptions::new(false, Some(true))
            .with_name("Main")
            .with_connection_name("Other")
            .with_database_type("SqlServer");

        let entry = options
            .provide_default_sharding_entry(&global(None, DatabaseType::NotSet), None)
            .unwrap();
        assert!(entry.is_none());
    }

    #[test]
    fn test_populated_fields_are_kept() {
        let options = ShardingEntryOptions::new(true, None)
            .with_name("Main")
            .with_connection_name("AuthDb")
            .with_database_type("Sqlite");

        let entry = options
            .provide_default_sharding_entry(&global(Some("Default Database"), DatabaseType::SqlServer), None)
            .unwrap()
            .unwrap();

        assert_eq!(entry, ShardingEntry::new("Main", "AuthDb", "Sqlite"));
    }

    #[test]
    fn test_defaults_are_filled_in() {
        let options = ShardingEntryOptions::new(true, None);

        let entry = options
            .provide_default_sharding_entry(&global(Some("Default Database"), DatabaseType::SqlServer), None)
            .unwrap()
            .unwrap();

        assert_eq!(entry.name, "Default Database");
        assert_eq!(entry.connection_name, "DefaultConnection");
        assert_eq!(entry.database_type, "SqlServer");
    }

    #[test]
    fn test_missing_name_fails() {
        let options = ShardingEntryOptions::new(true, None);

        let result = options.provide_default_sharding_entry(&global(None, DatabaseType::SqlServer), None);
        assert!(matches!(result, Err(ShardingError::MissingEntryName)));
    }

    #[test]
    fn test_blank_names_count_as_unset() {
        let options = ShardingEntryOptions::new(true, None).with_name("  ");

        let result = options.provide_default_sharding_entry(&global(Some(""), DatabaseType::SqlServer), None);
        assert!(matches!(result, Err(ShardingError::MissingEntryName)));

        let entry = options
            .provide_default_sharding_entry(&global(Some("Default Database"), DatabaseType::SqlServer), None)
            .unwrap()
            .unwrap();
        assert_eq!(entry.name, "Default Database");
    }

    #[test]
    fn test_invalid_resolved_entry_fails() {
        let options = ShardingEntryOptions::new(true, None).with_connection_name("not a key!");

        let result = options.provide_default_sharding_entry(&global(Some("Default Database"), DatabaseType::SqlServer), None);
        assert!(matches!(result, Err(ShardingError::InvalidEntry(_))));
    }

    #[test]
    fn test_unset_provider_fails() {
        let options = ShardingEntryOptions::new(true, None);

        let err = options
            .provide_default_sharding_entry(&global(Some("Default Database"), DatabaseType::NotSet), None)
            .unwrap_err();
        assert!(matches!(err, ShardingError::ProviderNotSet));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_custom_provider_name() {
        let options = ShardingEntryOptions::new(true, None);
        let source = StaticProviderName::new("MyCustomDb");

        let entry = options
            .provide_default_sharding_entry(
                &global(Some("Default Database"), DatabaseType::CustomDatabase),
                Some(&source),
            )
            .unwrap()
            .unwrap();
        assert_eq!(entry.database_type, "MyCustomDb");
    }

    #[test]
    fn test_custom_provider_without_source_fails() {
        let options = ShardingEntryOptions::new(true, None);

        let result = options.provide_default_sharding_entry(
            &global(Some("Default Database"), DatabaseType::CustomDatabase),
            None,
        );
        assert!(matches!(result, Err(ShardingError::MissingProviderNameSource)));
    }

    #[test]
    fn test_explicit_database_type_skips_provider_lookup() {
        // NotSet would fail if the backend were consulted
        let options = ShardingEntryOptions::new(true, None).with_database_type("PostgreSQL");

        let entry = options
            .provide_default_sharding_entry(&global(Some("Default Database"), DatabaseType::NotSet), None)
            .unwrap()
            .unwrap();
        assert_eq!(entry.database_type, "PostgreSQL");
    }

    #[test]
    fn test_remove_default_connection_defaults() {
        assert!(!ShardingEntryOptions::new(true, None).remove_default_connection_if_others);
        assert!(ShardingEntryOptions::new(false, None).remove_default_connection_if_others);
        assert!(ShardingEntryOptions::new(true, Some(false)).remove_default_connection_if_others);
        assert!(!ShardingEntryOptions::new(false, Some(true)).remove_default_connection_if_others);
        assert_eq!(ShardingEntryOptions::default().default_connection_name, "DefaultConnection");
    }

    #[test]
    fn test_resolve_in_place_only_fills_unset_fields() {
        let mut options = ShardingEntryOptions::new(true, None).with_connection_name("AuthDb");

        let entry = options
            .resolve_in_place(&global(Some("Default Database"), DatabaseType::SqliteInMemory), None)
            .unwrap()
            .unwrap();

        assert_eq!(options.name.as_deref(), Some("Default Database"));
        assert_eq!(options.connection_name.as_deref(), Some("AuthDb"));
        assert_eq!(options.database_type.as_deref(), Some("Sqlite"));
        assert_eq!(entry.connection_name, "AuthDb");

        // Second pass changes nothing
        let again = options
            .resolve_in_place(&global(Some("Other"), DatabaseType::SqlServer), None)
            .unwrap()
            .unwrap();
        assert_eq!(again, entry);
    }
}
