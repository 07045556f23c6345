// Tenant sharding admin
// Seeds the default sharding entry at start-up and manages entries

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::{Config, StoreConfig};
use dotenvy::dotenv;
use tenantshard_cache::{seed_default_entry, Cache, FileShardingStore, RedisShardingStore, ShardingEntryStore};
use tenantshard_database::ProviderNameSource;
use tenantshard_models::ShardingEntry;
use tenantshard_tenant::ShardingService;

#[derive(Parser)]
#[command(name = "tenantshard", about = "Manage the sharding entries of a multi-tenant application")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the default sharding entry and write it into an empty store
    Seed,
    /// List all sharding entries
    List,
    /// List sharding entries with the tenants using them
    Tenants {
        /// TENANT=ENTRY pairs
        #[arg(value_parser = parse_tenant)]
        tenants: Vec<(String, String)>,
    },
    /// Add a new sharding entry
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        connection_name: String,
        #[arg(long)]
        database_type: String,
        #[arg(long)]
        database_name: Option<String>,
    },
    /// Remove a sharding entry
    Remove { name: String },
    /// Print the connection string of a sharding entry
    ConnectionString { name: String },
}

fn parse_tenant(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(tenant, entry)| (tenant.trim().to_string(), entry.trim().to_string()))
        .ok_or_else(|| format!("expected TENANT=ENTRY, got {}", value))
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tenantshard_api=debug".to_string()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid sharding configuration")?;
    tracing::debug!(
        tenants_in_auth_pdb = config.sharding.tenants_in_auth_pdb,
        database_type = %config.sharding.database_type,
        connection_strings = config.connection_strings.len(),
        "Loaded configuration"
    );

    match config.store.clone() {
        StoreConfig::File(path) => {
            let store = FileShardingStore::new(path);
            tracing::info!("Using sharding file store {}", store.path().display());
            execute(cli, &config, store).await
        }
        StoreConfig::Redis(cache_config) => {
            tracing::info!("Connecting to Redis...");
            let cache = Cache::new(cache_config)
                .await
                .context("Failed to connect to Redis")?;
            cache.ping().await.context("Redis ping failed")?;
            execute(cli, &config, RedisShardingStore::new(cache)).await
        }
    }
}

async fn execute<S: ShardingEntryStore>(cli: Cli, config: &Config, store: S) -> anyhow::Result<()> {
    let options = config.sharding.entry_options();
    let service = ShardingService::new(store, config.connection_strings.clone(), options.clone());

    match cli.command.unwrap_or(Command::Seed) {
        Command::Seed => {
            if !options.tenants_in_auth_pdb() {
                tracing::info!("Tenants have their own databases, the default connection gets no sharding entry");
            }

            let source = config.sharding.provider_name_source();
            let default_entry = options
                .provide_default_sharding_entry(
                    &config.sharding.global_options(),
                    source.as_ref().map(|s| s as &dyn ProviderNameSource),
                )
                .context("Cannot resolve the default sharding entry")?;

            let seeded = seed_default_entry(service.store(), default_entry.as_ref()).await?;
            if !seeded {
                tracing::info!("Sharding store left unchanged");
            }
        }
        Command::List => print_json(&service.get_all_entries().await?)?,
        Command::Tenants { tenants } => {
            print_json(&service.entries_with_tenant_names(tenants).await?)?
        }
        Command::Add {
            name,
            connection_name,
            database_type,
            database_name,
        } => {
            let mut entry = ShardingEntry::new(name, connection_name, database_type);
            entry.database_name = database_name;
            print_json(&service.add_entry(entry).await?)?;
        }
        Command::Remove { name } => service.remove_entry(&name).await?,
        Command::ConnectionString { name } => println!("{}", service.connection_string_for(&name).await?),
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
