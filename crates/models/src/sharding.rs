use serde::{Deserialize, Serialize};
use validator::Validate;

/// A named sharding entry: which connection string a logical database uses,
/// and which database provider serves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShardingEntry {
    /// Unique within a sharding-entry store
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Key into the connection-string table
    #[validate(length(min = 1, max = 255), regex(path = *CONNECTION_NAME_REGEX))]
    pub connection_name: String,

    /// Provider short name, e.g. "SqlServer", "PostgreSQL", "Sqlite"
    #[validate(length(min = 1, max = 64))]
    pub database_type: String,

    /// Database name applied when forming the connection string (None = use it as is)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub database_name: Option<String>,
}

impl ShardingEntry {
    pub fn new(
        name: impl Into<String>,
        connection_name: impl Into<String>,
        database_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            connection_name: connection_name.into(),
            database_type: database_type.into(),
            database_name: None,
        }
    }

    pub fn with_database_name(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = Some(database_name.into());
        self
    }
}

/// Database backend the application is configured with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    #[default]
    NotSet,
    SqliteInMemory,
    SqlServer,
    #[serde(rename = "PostgreSQL")]
    PostgreSql,
    CustomDatabase,
}

impl DatabaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotSet => "NotSet",
            Self::SqliteInMemory => "SqliteInMemory",
            Self::SqlServer => "SqlServer",
            Self::PostgreSql => "PostgreSQL",
            Self::CustomDatabase => "CustomDatabase",
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DatabaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "notset" | "" => Ok(Self::NotSet),
            "sqliteinmemory" => Ok(Self::SqliteInMemory),
            "sqlserver" => Ok(Self::SqlServer),
            "postgresql" | "postgres" => Ok(Self::PostgreSql),
            "customdatabase" => Ok(Self::CustomDatabase),
            _ => Err(format!("Invalid database type: {}", s)),
        }
    }
}

// Connection names double as environment variable suffixes
lazy_static::lazy_static! {
    static ref CONNECTION_NAME_REGEX: regex::Regex = regex::Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
}
