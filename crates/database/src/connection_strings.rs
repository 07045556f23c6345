use crate::default_entry::ShardingEntryOptions;
use crate::error::{Result, ShardingError};
use crate::provider::{POSTGRESQL, SQLITE, SQL_SERVER};
use std::collections::BTreeMap;
use tenantshard_models::ShardingEntry;

/// Prefix of environment variables holding connection strings
pub const CONNECTION_STRING_ENV_PREFIX: &str = "CONNECTIONSTRINGS__";

/// The application's connection-string table, keyed by connection name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStrings {
    entries: BTreeMap<String, String>,
}

impl ConnectionStrings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `CONNECTIONSTRINGS__<NAME>` environment variable (prefix in any case)
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter_map(|(key, value)| {
                strip_prefix_ignore_case(&key, CONNECTION_STRING_ENV_PREFIX)
                    .filter(|name| !name.is_empty())
                    .map(|name| (name.to_string(), value))
            })
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, connection_string: impl Into<String>) {
        self.entries.insert(name.into(), connection_string.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Connection names a sharding entry may use, sorted
    pub fn eligible_connection_names(&self, options: &ShardingEntryOptions) -> Vec<String> {
        let has_others = self
            .entries
            .keys()
            .any(|name| name != &options.default_connection_name);

        self.entries
            .keys()
            .filter(|name| {
                !(options.remove_default_connection_if_others
                    && has_others
                    && *name == &options.default_connection_name)
            })
            .cloned()
            .collect()
    }

    /// Build the connection string for an entry, applying its database name
    pub fn form_connection_string(&self, entry: &ShardingEntry) -> Result<String> {
        let connection_string = self
            .get(&entry.connection_name)
            .ok_or_else(|| ShardingError::UnknownConnectionName(entry.connection_name.clone()))?;

        let Some(database_name) = &entry.database_name else {
            return Ok(connection_string.to_string());
        };

        // First keyword is written, the rest are synonyms it replaces
        let keywords: &[&str] = match entry.database_type.as_str() {
            SQL_SERVER => &["Initial Catalog", "Database"],
            POSTGRESQL => &["Database", "DB"],
            SQLITE => &["Data Source", "DataSource", "Filename"],
            other => return Err(ShardingError::UnsupportedConnectionFormat(other.to_string())),
        };

        Ok(set_keyword(connection_string, keywords, database_name))
    }
}

impl FromIterator<(String, String)> for ConnectionStrings {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn strip_prefix_ignore_case<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .map(|_| &key[prefix.len()..])
}

// Set `keywords[0]=value` in a `key=value;` string. The first part using any of
// the keywords (case-insensitive) is replaced, later ones dropped; appended if none.
fn set_keyword(connection_string: &str, keywords: &[&str], value: &str) -> String {
    let keyword = keywords[0];
    let mut found = false;
    let mut parts: Vec<String> = Vec::new();

    for part in connection_string.split(';').map(str::trim).filter(|part| !part.is_empty()) {
        let key = part.split('=').next().unwrap_or_default().trim();
        if keywords.iter().any(|k| key.eq_ignore_ascii_case(k)) {
            if !found {
                found = true;
                parts.push(format!("{}={}", keyword, value));
            }
        } else {
            parts.push(part.to_string());
        }
    }

    if !found {
        parts.push(format!("{}={}", keyword, value));
    }

    let mut formed = parts.join(";");
    formed.push(';');
    formed
}
