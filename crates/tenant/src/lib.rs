// Sharding-entry management for tenants

pub mod sharding_service;

pub use sharding_service::{ShardingEntryWithTenants, ShardingService};
