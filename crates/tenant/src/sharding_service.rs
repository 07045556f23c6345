use serde::Serialize;
use std::collections::BTreeMap;
use tenantshard_cache::{CacheError, ShardingEntryStore};
use tenantshard_database::{ConnectionStrings, Result, ShardingEntryOptions, ShardingError};
use tenantshard_models::ShardingEntry;
use validator::Validate;

/// A sharding entry and the tenants whose data lives in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardingEntryWithTenants {
    pub entry: ShardingEntry,
    pub tenant_names: Vec<String>,
}

/// Reads and edits the sharding entries of an application
pub struct ShardingService<S> {
    store: S,
    connection_strings: ConnectionStrings,
    options: ShardingEntryOptions,
}

impl<S: ShardingEntryStore> ShardingService<S> {
    pub fn new(store: S, connection_strings: ConnectionStrings, options: ShardingEntryOptions) -> Self {
        Self {
            store,
            connection_strings,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Connection names that entries may refer to
    pub fn connection_names(&self) -> Vec<String> {
        self.connection_strings.eligible_connection_names(&self.options)
    }

    pub async fn get_all_entries(&self) -> Result<Vec<ShardingEntry>> {
        self.store.get_all().await.map_err(store_error)
    }

    pub async fn get_entry(&self, name: &str) -> Result<ShardingEntry> {
        self.store
            .get(name)
            .await
            .map_err(store_error)?
            .ok_or_else(|| ShardingError::not_found(name))
    }

    pub async fn add_entry(&self, entry: ShardingEntry) -> Result<ShardingEntry> {
        self.validate(&entry)?;

        if self.store.get(&entry.name).await.map_err(store_error)?.is_some() {
            return Err(ShardingError::duplicate(&entry.name));
        }

        self.store.set(&entry).await.map_err(store_error)?;
        tracing::info!(entry = %entry.name, connection = %entry.connection_name, "Added sharding entry");
        Ok(entry)
    }

    pub async fn update_entry(&self, entry: ShardingEntry) -> Result<ShardingEntry> {
        self.validate(&entry)?;
        self.get_entry(&entry.name).await?;

        self.store.set(&entry).await.map_err(store_error)?;
        tracing::info!(entry = %entry.name, "Updated sharding entry");
        Ok(entry)
    }

    pub async fn remove_entry(&self, name: &str) -> Result<()> {
        if !self.store.remove(name).await.map_err(store_error)? {
            return Err(ShardingError::not_found(name));
        }

        tracing::info!(entry = %name, "Removed sharding entry");
        Ok(())
    }

    /// Connection string for the named entry, with its database name applied
    pub async fn connection_string_for(&self, name: &str) -> Result<String> {
        let entry = self.get_entry(name).await?;
        self.connection_strings.form_connection_string(&entry)
    }

    /// Every entry with the names of the tenants using it.
    ///
    /// `tenants` holds `(tenant_name, sharding_entry_name)` pairs.
    pub async fn entries_with_tenant_names<I, T, E>(&self, tenants: I) -> Result<Vec<ShardingEntryWithTenants>>
    where
        I: IntoIterator<Item = (T, E)>,
        T: Into<String>,
        E: AsRef<str>,
    {
        let mut grouped: BTreeMap<String, ShardingEntryWithTenants> = self
            .get_all_entries()
            .await?
            .into_iter()
            .map(|entry| {
                (
                    entry.name.clone(),
                    ShardingEntryWithTenants {
                        entry,
                        tenant_names: Vec::new(),
                    },
                )
            })
            .collect();

        for (tenant, entry_name) in tenants {
            let tenant: String = tenant.into();
            let entry_name = entry_name.as_ref();
            match grouped.get_mut(entry_name) {
                Some(group) => group.tenant_names.push(tenant),
                None => tracing::warn!(
                    tenant = %tenant,
                    entry = %entry_name,
                    "Tenant refers to an unknown sharding entry"
                ),
            }
        }

        Ok(grouped
            .into_values()
            .map(|mut group| {
                group.tenant_names.sort();
                group
            })
            .collect())
    }

    fn validate(&self, entry: &ShardingEntry) -> Result<()> {
        entry
            .validate()
            .map_err(|e| ShardingError::InvalidEntry(e.to_string()))?;

        if !self.connection_names().contains(&entry.connection_name) {
            return Err(ShardingError::UnknownConnectionName(entry.connection_name.clone()));
        }

        Ok(())
    }
}

fn store_error(err: CacheError) -> ShardingError {
    ShardingError::Store(err.to_string())
}
