//! `nmr`: run one Numeraire ledger operation against a state file.
//!
//! Each invocation loads the state file, applies a single command as
//! `--caller`, saves the state if it changed, and prints the result as JSON
//! on stdout. Logs go to stderr.

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use nmr_contract::NumeraireConfig;
use nmr_types::{Address, FixedClock, Timestamp};
use nmr_utils::LogFormat;

use crate::commands::Command;

#[derive(Parser)]
#[command(name = "nmr", about = "Numeraire tournament ledger")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base; CLI
    /// flags and env vars override them.
    #[arg(long, env = "NMR_CONFIG")]
    config: Option<PathBuf>,

    /// State file to operate on.
    #[arg(long, env = "NMR_STATE")]
    state: Option<PathBuf>,

    /// Identity the operation is performed as.
    #[arg(long, env = "NMR_CALLER")]
    caller: Option<Address>,

    /// Current time in Unix seconds. Defaults to the system clock.
    #[arg(long, env = "NMR_NOW")]
    now: Option<u64>,

    /// Log format: "human" or "json".
    #[arg(long, env = "NMR_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "NMR_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => NumeraireConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NumeraireConfig::default(),
    };
    let config = NumeraireConfig {
        state_path: cli.state.unwrap_or(file_config.state_path),
        log_format: cli.log_format.unwrap_or(file_config.log_format),
        log_level: cli.log_level.unwrap_or(file_config.log_level),
        params: file_config.params,
    };

    let format: LogFormat = config.log_format.parse()?;
    nmr_utils::init_logging(format, &config.log_level);

    let now = cli.now.map(Timestamp::new).unwrap_or_else(Timestamp::now);
    let clock = FixedClock(now);
    tracing::debug!(state = %config.state_path.display(), %now, "running command");

    let output = commands::run(cli.command, &config, clock, cli.caller)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
