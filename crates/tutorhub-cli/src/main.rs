//! `tutorhub-cli`: administration of material trees and student access.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tutorhub_core::error::{AppError, ErrorKind};

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&e.to_string());
            ExitCode::from(exit_status(&e))
        }
    }
}

fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Scripts tell bad input, missing materials, and lock contention apart by
/// exit status.
fn exit_status(err: &AppError) -> u8 {
    match err.kind {
        ErrorKind::Validation => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Conflict => 4,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_directive(0), "warn");
        assert_eq!(default_directive(2), "debug");
        assert_eq!(default_directive(9), "trace");
    }

    #[test]
    fn test_exit_codes_by_kind() {
        assert_eq!(exit_status(&AppError::validation("bad")), 2);
        assert_eq!(exit_status(&AppError::not_found("gone")), 3);
        assert_eq!(exit_status(&AppError::conflict("busy")), 4);
        assert_eq!(exit_status(&AppError::database("down")), 1);
    }
}
