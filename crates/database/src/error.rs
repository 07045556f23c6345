use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShardingError>;

#[derive(Debug, Error)]
pub enum ShardingError {
    #[error("No sharding entry name: set the entry's name or the default sharding entry name")]
    MissingEntryName,

    #[error("Database provider not set: choose a database type before start-up")]
    ProviderNotSet,

    #[error("Unrecognized database provider: {0}")]
    UnrecognizedProvider(String),

    #[error("Custom database provider selected but no provider name source was given")]
    MissingProviderNameSource,

    #[error(transparent)]
    ProviderLookup(anyhow::Error),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Entity not found: {0}")]
    EntryNotFound(String),

    #[error("Unknown connection name: {0}")]
    UnknownConnectionName(String),

    #[error("Invalid input: {0}")]
    InvalidEntry(String),

    #[error("Cannot apply a database name for provider: {0}")]
    UnsupportedConnectionFormat(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl ShardingError {
    pub fn not_found(name: &str) -> Self {
        Self::EntryNotFound(format!("sharding entry {} not found", name))
    }

    pub fn duplicate(name: &str) -> Self {
        Self::DuplicateEntry(format!("sharding entry with name {} already exists", name))
    }

    /// True for the start-up configuration errors raised by default-entry resolution
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingEntryName
                | Self::ProviderNotSet
                | Self::UnrecognizedProvider(_)
                | Self::MissingProviderNameSource
                | Self::Configuration(_)
        )
    }
}
