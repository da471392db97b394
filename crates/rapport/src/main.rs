// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rapport - a persona-driven Telegram companion.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rapport_config::{ConfigError, RapportConfig};
use rapport_core::RapportError;

/// Exit code for configuration errors and runtime failures.
const EXIT_FAILURE: u8 = 1;
/// Exit code when another instance already polls the same bot.
const EXIT_DUPLICATE_INSTANCE: u8 = 2;

/// Rapport - a persona-driven Telegram companion.
#[derive(Parser, Debug)]
#[command(name = "rapport", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to Telegram and start answering messages.
    Serve,
    /// Load and validate the configuration, then exit.
    CheckConfig,
}

fn load(path: Option<&PathBuf>) -> Result<RapportConfig, Vec<ConfigError>> {
    match path {
        Some(path) => rapport_config::load_and_validate_path(path),
        None => rapport_config::load_and_validate(),
    }
}

fn exit_code_for(err: &RapportError) -> u8 {
    match err {
        RapportError::DuplicateProcessInstance(_) => EXIT_DUPLICATE_INSTANCE,
        _ => EXIT_FAILURE,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            rapport_config::render_errors(&errors);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(errors) = rapport_config::require_secrets(&config) {
                rapport_config::render_errors(&errors);
                return ExitCode::from(EXIT_FAILURE);
            }
            match serve::run_serve(config).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: {e}");
                    ExitCode::from(exit_code_for(&e))
                }
            }
        }
        Some(Commands::CheckConfig) => {
            println!(
                "rapport: config ok (persona={}, database={}, model={})",
                config.persona.name, config.storage.database_path, config.completion.model
            );
            if let Err(errors) = rapport_config::require_secrets(&config) {
                eprintln!("rapport: secrets missing, `serve` will refuse to start:");
                rapport_config::render_errors(&errors);
            }
            ExitCode::SUCCESS
        }
        None => {
            println!("rapport: use --help for available commands");
            ExitCode::SUCCESS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::parse_from(["rapport", "serve"]);
        assert!(matches!(cli.command, Some(Commands::Serve)));

        let cli = Cli::parse_from(["rapport", "check-config", "--config", "/tmp/rapport.toml"]);
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/rapport.toml")));
    }

    #[test]
    fn duplicate_instance_exits_with_two() {
        let dup = RapportError::DuplicateProcessInstance("conflict".into());
        assert_eq!(exit_code_for(&dup), 2);
        assert_eq!(exit_code_for(&RapportError::Internal("boom".into())), 1);
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rapport.toml");
        std::fs::write(&path, "[persona]\nname = \"Юля\"\n").unwrap();

        let config = load(Some(&path)).expect("file config should be valid");
        assert_eq!(config.persona.name, "Юля");
    }
}
