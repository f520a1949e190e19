//! Command-line interface for the Palate taste engine.
//!
//! Every subcommand opens the SQLite database named by `--database` (or
//! `PALATE_DATABASE`), runs one engine operation and prints the result as
//! pretty JSON wrapped in the standard response envelope.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;

mod commands;
mod config;
mod error;

use commands::{Command, Services, execute, write_envelope};
use config::{EngineArgs, resolve_engine_config};
pub use error::CliError;

/// Run the Palate CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments, configuration or the requested
/// operation fail.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_with(cli, std::env::vars(), &mut stdout)
}

fn run_with<I>(cli: Cli, environment: I, writer: &mut dyn Write) -> Result<(), CliError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let config = resolve_engine_config(&cli.engine, cli.config.as_deref(), environment)?;
    let services = Services::open(&config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let payload = runtime.block_on(execute(cli.command, &services))?;
    write_envelope(writer, payload)
}

#[derive(Debug, Parser)]
#[command(
    name = "palate",
    about = "Taste similarity and Gourmet Friend tooling for the Palate engine",
    version
)]
struct Cli {
    /// JSON file supplying defaults for the engine options.
    #[arg(long = "config", value_name = "path", global = true)]
    config: Option<Utf8PathBuf>,
    #[command(flatten)]
    engine: EngineArgs,
    #[command(subcommand)]
    command: Command,
}

#[cfg(test)]
mod tests;
