//! CLI command definitions and dispatch.

pub mod access;
pub mod material;
pub mod migrate;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use tutorhub_core::config::AppConfig;
use tutorhub_core::error::AppError;
use tutorhub_database::DatabasePool;
use tutorhub_database::repositories::{
    DirectoryRepository, MaterialRepository, VisibilityRepository,
};

/// TutorHub materials administration
#[derive(Debug, Parser)]
#[command(name = "tutorhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Inspect material trees
    Material(material::MaterialArgs),
    /// Assign and report student access
    Access(access::AccessArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.config, self.format).await,
            Commands::Material(args) => material::execute(args, &self.config, self.format).await,
            Commands::Access(args) => access::execute(args, &self.config, self.format).await,
        }
    }
}

/// PostgreSQL stores used by the data commands.
pub struct Stores {
    pub materials: Arc<MaterialRepository>,
    pub visibility: Arc<VisibilityRepository>,
    pub directory: Arc<DirectoryRepository>,
}

/// Load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_file(config_path)
}

/// Connect to the configured database
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Connect and build the repositories
pub async fn open_stores(config_path: &str) -> Result<Stores, AppError> {
    let config = load_config(config_path)?;
    let pool = connect(&config).await?.into_pool();
    Ok(Stores {
        materials: Arc::new(MaterialRepository::new(pool.clone())),
        visibility: Arc::new(VisibilityRepository::new(pool.clone())),
        directory: Arc::new(DirectoryRepository::new(pool)),
    })
}
