// crates/infohub-cli/src/main.rs
// ============================================================================
// Module: Info Hub CLI Entry Point
// Description: Command dispatcher for the Info Hub server and export store.
// Purpose: Run the HTTP server, validate configuration, and manage stored
//          export configurations.
// Dependencies: clap, infohub-config, infohub-core, infohub-server,
//               infohub-store-sqlite, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! `infohub serve` runs the HTTP API. `infohub config validate` checks a
//! configuration file without starting anything. `infohub store` loads, lists,
//! and deletes export configurations in the `SQLite` export store named by the
//! configuration.
//!
//! Export files hold either one export configuration object or an array of
//! them, in the same camelCase shape the store persists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use infohub_config::InfoHubConfig;
use infohub_config::validate_exports;
use infohub_core::ExportConfiguration;
use infohub_core::ExportName;
use infohub_server::InfoHubServer;
use infohub_store_sqlite::SqliteExportStore;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum size of an export configuration file.
const MAX_EXPORT_FILE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Info Hub command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "infohub",
    about = "Info Hub export and import gateway",
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct Cli {
    /// Prints the version and exits.
    #[arg(long, short = 'V')]
    version: bool,
    /// Selected subcommand.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the HTTP server.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Export store utilities.
    Store {
        /// Selected store subcommand.
        #[command(subcommand)]
        command: StoreCommand,
    },
}

/// Arguments for `serve`.
#[derive(clap::Args, Debug)]
struct ServeCommand {
    /// Configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validates a configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(clap::Args, Debug)]
struct ConfigValidateCommand {
    /// Configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Store subcommands.
#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Loads export configurations from JSON files.
    Load(StoreLoadCommand),
    /// Lists stored export names.
    List(StoreListCommand),
    /// Deletes a stored export configuration.
    Delete(StoreDeleteCommand),
}

/// Arguments for `store load`.
#[derive(clap::Args, Debug)]
struct StoreLoadCommand {
    /// Configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Export configuration files.
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

/// Arguments for `store list`.
#[derive(clap::Args, Debug)]
struct StoreListCommand {
    /// Configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `store delete`.
#[derive(clap::Args, Debug)]
struct StoreDeleteCommand {
    /// Configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Export name to delete.
    #[arg(value_name = "NAME")]
    name: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error with a rendered message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Rendered message.
    message: String,
}

impl CliError {
    /// Creates a CLI error.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Parses arguments and dispatches the selected command.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.version {
        write_stdout_line(&format!("infohub {}", env!("CARGO_PKG_VERSION")))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        return Err(CliError::new("no command given; see infohub --help".to_string()));
    };
    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command: ConfigCommand::Validate(command),
        } => command_config_validate(&command),
        Commands::Store {
            command,
        } => command_store(command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `serve`.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let server = tokio::task::spawn_blocking(move || InfoHubServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?
        .map_err(|err| CliError::new(err.to_string()))?;
    server.serve().await.map_err(|err| CliError::new(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config validate`.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    write_stdout_line(&format!("config ok ({} inline exports)", config.exports.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes a `store` subcommand.
fn command_store(command: StoreCommand) -> CliResult<ExitCode> {
    match command {
        StoreCommand::Load(command) => {
            let store = open_store(command.config.as_deref())?;
            let loaded = load_export_files(&store, &command.files)?;
            write_stdout_line(&format!("loaded {loaded} export configurations"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        StoreCommand::List(command) => {
            let store = open_store(command.config.as_deref())?;
            let names = store.list().map_err(|err| CliError::new(err.to_string()))?;
            for name in names {
                write_stdout_line(name.as_str())
                    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            }
        }
        StoreCommand::Delete(command) => {
            let store = open_store(command.config.as_deref())?;
            let name = ExportName::new(command.name);
            let removed = store.delete(&name).map_err(|err| CliError::new(err.to_string()))?;
            if !removed {
                return Err(CliError::new(format!("export not found: {name}")));
            }
            write_stdout_line(&format!("deleted {name}"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Store Helpers
// ============================================================================

/// Loads configuration, mapping failures to CLI errors.
fn load_config(path: Option<&Path>) -> CliResult<InfoHubConfig> {
    InfoHubConfig::load(path).map_err(|err| CliError::new(err.to_string()))
}

/// Opens the `SQLite` export store named by configuration.
fn open_store(path: Option<&Path>) -> CliResult<SqliteExportStore> {
    let config = load_config(path)?;
    let Some(sqlite) = config.export_store.sqlite() else {
        return Err(CliError::new(
            "store commands require export_store.type = \"sqlite\"".to_string(),
        ));
    };
    SqliteExportStore::new(&sqlite).map_err(|err| CliError::new(err.to_string()))
}

/// Reads, validates, and stores every export in `files`.
///
/// All files are validated as one batch before anything is written.
fn load_export_files(store: &SqliteExportStore, files: &[PathBuf]) -> CliResult<usize> {
    let mut exports = Vec::new();
    for file in files {
        exports.extend(read_export_file(file)?);
    }
    validate_exports(&exports).map_err(|err| CliError::new(err.to_string()))?;
    for export in &exports {
        store.put(export).map_err(|err| CliError::new(err.to_string()))?;
    }
    Ok(exports.len())
}

/// Parses one export file holding an object or an array of objects.
fn read_export_file(path: &Path) -> CliResult<Vec<ExportConfiguration>> {
    let bytes = read_bytes_with_limit(path, MAX_EXPORT_FILE_BYTES).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(format!("failed to read {}: {err}", path.display()))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!(
            "{} is {size} bytes, exceeding the {limit} byte limit",
            path.display()
        )),
    })?;
    let invalid = |err: serde_json::Error| {
        CliError::new(format!("invalid export file {}: {err}", path.display()))
    };
    let value: Value = serde_json::from_slice(&bytes).map_err(invalid)?;
    match value {
        Value::Array(_) => serde_json::from_value(value).map_err(invalid),
        _ => serde_json::from_value(value).map(|export| vec![export]).map_err(invalid),
    }
}

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(stderr, "{message}")
}

/// Renders an output stream failure.
fn output_error(stream: &str, err: &std::io::Error) -> String {
    format!("failed to write {stream}: {err}")
}

/// Reports an error on stderr and returns the failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(&format!("infohub: {message}"));
    ExitCode::FAILURE
}

#[cfg(test)]
mod main_tests;
