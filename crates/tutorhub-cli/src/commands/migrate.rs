//! Schema migration commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use tutorhub_core::error::AppError;
use tutorhub_database::migration::{self, MigrationState};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply pending migrations
    Run,
    /// List embedded migrations and whether each is applied
    Status,
}

#[derive(Debug, Serialize, Tabled)]
struct MigrationRow {
    version: i64,
    description: String,
    state: &'static str,
}

impl From<MigrationState> for MigrationRow {
    fn from(m: MigrationState) -> Self {
        Self {
            version: m.version,
            description: m.description,
            state: if m.applied { "applied" } else { "pending" },
        }
    }
}

/// Execute migration commands
pub async fn execute(
    args: &MigrateArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let pool = super::connect(&config).await?;

    let result = match &args.command {
        MigrateCommand::Run => migration::run_migrations(pool.pool()).await.map(|applied| {
            if applied == 0 {
                output::print_success("Schema already up to date.");
            } else {
                output::print_success(&format!("Applied {applied} migration(s)."));
            }
        }),
        MigrateCommand::Status => migration::migration_status(pool.pool()).await.map(|states| {
            let rows: Vec<MigrationRow> = states.into_iter().map(MigrationRow::from).collect();
            output::print_list(&rows, format);
        }),
    };

    pool.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_state_label() {
        let row = MigrationRow::from(MigrationState {
            version: 20260101000003,
            description: "create material visibility".to_string(),
            applied: false,
        });
        assert_eq!(row.state, "pending");
        assert_eq!(row.version, 20260101000003);
    }
}
