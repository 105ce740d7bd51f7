//! Spendwise CLI — entry point.
//!
//! # Commands
//!
//! - `spendwise classify [FILE] --path PATH` — which provider a request body is for
//! - `spendwise route [FILE] --path PATH` — full routing decision under the current config
//! - `spendwise batch FILE` — classify a JSONL capture and tally by provider
//! - `spendwise status` — show configuration and provider credential status
//! - `spendwise onboard` — write the default config

mod batch;
mod classify_cmd;
mod helpers;
mod onboard;
mod status;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use spendwise_core::config::load_config;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Spendwise — classify and route LLM API traffic by provider
#[derive(Parser)]
#[command(name = "spendwise", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.spendwise/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one request body (from FILE or stdin)
    Classify {
        /// JSON body file. Omit to read stdin.
        file: Option<PathBuf>,

        /// Inbound request path (e.g. "/v1/chat/completions")
        #[arg(short, long, default_value = "")]
        path: String,

        /// Show the extracted signature and the rule that matched
        #[arg(long, default_value_t = false)]
        explain: bool,

        /// Print machine-readable JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Resolve the upstream route for one request body (from FILE or stdin)
    Route {
        /// JSON body file. Omit to read stdin.
        file: Option<PathBuf>,

        /// Inbound request path (e.g. "/v1/messages")
        #[arg(short, long, default_value = "")]
        path: String,

        /// Print machine-readable JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Classify a JSONL file of {"path": ..., "body": ...} records
    Batch {
        /// JSONL file
        file: PathBuf,

        /// Print machine-readable JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show configuration and provider status
    Status,

    /// Initialize configuration
    Onboard,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    let config_path = cli.config.as_deref().map(|p| helpers::expand_tilde(&p.to_string_lossy()));

    match cli.command {
        Commands::Classify {
            file,
            path,
            explain,
            json,
        } => {
            let config = load_config(config_path.as_deref());
            classify_cmd::run_classify(&config, file.as_deref(), &path, explain, json)
        }
        Commands::Route { file, path, json } => {
            let config = load_config(config_path.as_deref());
            classify_cmd::run_route(&config, file.as_deref(), &path, json)
        }
        Commands::Batch { file, json } => {
            let config = load_config(config_path.as_deref());
            batch::run(&config, &file, json)
        }
        Commands::Status => status::run(config_path.as_deref()),
        Commands::Onboard => onboard::run(config_path.as_deref()),
    }
}

/// Initialize tracing/logging. Logs go to stderr so `--json` output stays clean.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("spendwise=debug,spendwise_core=debug,spendwise_providers=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
