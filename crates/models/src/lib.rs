pub mod sharding;

pub use sharding::{DatabaseType, ShardingEntry};
