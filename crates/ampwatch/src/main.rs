// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ampwatch - keeps a log of a dormitory's electricity meter.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ampwatch - keeps a log of a dormitory's electricity meter.
#[derive(Parser, Debug)]
#[command(name = "ampwatch", version, about, long_about = None)]
struct Cli {
    /// Load this file (plus AMPWATCH_* env vars) instead of the usual search path.
    #[arg(long, short, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Poll the portal on a schedule and serve the HTTP endpoints (default).
    Serve,
    /// Fetch one reading now, store it, and print it.
    Fetch {
        /// Query this customer instead of the configured one; the result is not stored.
        #[arg(long)]
        cust_id: Option<String>,
    },
    /// Print stored readings.
    Logs {
        /// Number of entries; 0 prints all.
        #[arg(long, short, default_value_t = 10)]
        limit: usize,
        /// Oldest first.
        #[arg(long)]
        ascending: bool,
        /// Print CSV instead of JSON.
        #[arg(long)]
        csv: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => ampwatch_config::load_and_validate_path(path),
        None => ampwatch_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            ampwatch_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    serve::init_tracing(&config.logging.level);

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Fetch { cust_id } => commands::run_fetch(config, cust_id).await,
        Commands::Logs {
            limit,
            ascending,
            csv,
        } => commands::run_logs(config, limit, ascending, csv).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "ampwatch exited with an error");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["ampwatch"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn logs_flags_parse() {
        let cli =
            Cli::try_parse_from(["ampwatch", "logs", "--limit", "0", "--ascending", "--csv"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Logs {
                limit: 0,
                ascending: true,
                csv: true
            })
        );
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["ampwatch", "fetch", "--config", "/tmp/a.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/a.toml")));
        assert_eq!(cli.command, Some(Commands::Fetch { cust_id: None }));
    }

    #[test]
    fn default_config_is_valid() {
        let config = ampwatch_config::load_and_validate_str("").expect("defaults should validate");
        assert_eq!(config.poll.interval_secs, 600);
    }
}
