pub mod config;
pub mod connection_strings;
pub mod default_entry;
pub mod error;
pub mod options;
pub mod provider;

pub use config::ShardingConfig;
pub use connection_strings::ConnectionStrings;
pub use default_entry::{ShardingEntryOptions, DEFAULT_CONNECTION_NAME};
pub use error::{Result, ShardingError};
pub use options::{AuthPermissionsOptions, InternalData};
pub use provider::{parse_database_type, provider_short_name, ProviderNameSource, StaticProviderName};
