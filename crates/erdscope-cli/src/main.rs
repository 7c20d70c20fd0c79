mod config;
mod logging;
mod output;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use erdscope_core::{redact_connection_string, validate_schema, Error as CoreError};
use erdscope_introspect::{normalize_driver, ExtractorRegistry, Introspector};
use thiserror::Error;

use config::{build_driver_and_dsn, load_config, AppConfig, ConfigError};
use logging::{init_logging, LogFormat};
use output::{to_pretty_json, write_json_atomic, OutputError};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("logging error: {0}")]
    Logging(std::io::Error),
    #[error("{0}")]
    Extract(#[from] erdscope_introspect::Error),
    #[error("invalid schema: {0}")]
    Core(#[from] CoreError),
    #[error("output error: {0}")]
    Output(#[from] OutputError),
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

#[derive(Parser, Debug)]
#[command(name = "erdscope", version, about = "Extract relational schemas for ER diagrams")]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
    /// Append logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect to a database and print its schema as JSON.
    Extract(ExtractArgs),
    /// List the driver names extractors are registered under.
    Dialects,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// TOML configuration file with a [database] table.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Driver name (postgres, mysql, sqlite, sqlserver, oracle or an alias).
    #[arg(long, requires = "dsn")]
    driver: Option<String>,
    /// Connection string, overriding the configuration file.
    #[arg(long, requires = "driver")]
    dsn: Option<String>,
    /// Deadline in seconds for connecting and extracting.
    #[arg(long)]
    timeout: Option<u64>,
    /// Write the schema to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Fail when the extracted schema is inconsistent.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_file.as_deref()).map_err(CliError::Logging)?;

    let registry = Arc::new(ExtractorRegistry::builtin());
    match cli.command {
        Command::Extract(args) => run_extract(args, registry).await,
        Command::Dialects => list_dialects(&registry),
    }
}

async fn run_extract(args: ExtractArgs, registry: Arc<ExtractorRegistry>) -> Result<(), CliError> {
    let app_config = match &args.config {
        Some(path) => {
            let config = load_config(path)?;
            tracing::info!(event = "config_loaded", path = %path.display());
            config
        }
        None => AppConfig::default(),
    };

    let (driver, dsn) = match (args.driver, args.dsn) {
        (Some(driver), Some(dsn)) => (normalize_driver(&driver), dsn),
        _ if args.config.is_some() => build_driver_and_dsn(&app_config.database)?,
        _ => {
            return Err(CliError::InvalidArgs(
                "either --config or --driver with --dsn is required".to_string(),
            ));
        }
    };
    let timeout = Duration::from_secs(args.timeout.unwrap_or(app_config.extract.timeout_secs));

    let target = redact_connection_string(&dsn);
    tracing::info!(
        event = "run_started",
        driver = %driver,
        host = target.host.as_deref().unwrap_or(""),
        database = target.database.as_deref().unwrap_or(""),
        timeout_secs = timeout.as_secs()
    );
    let timer = Instant::now();

    let schema = Introspector::native(registry)
        .connect_and_extract(&driver, &dsn, timeout)
        .await?;

    if let Err(err) = validate_schema(&schema) {
        if args.strict {
            return Err(err.into());
        }
        tracing::warn!(event = "schema_validation_failed", error = %err);
    }

    match &args.out {
        Some(path) => {
            write_json_atomic(path, &schema)?;
            tracing::info!(event = "schema_written", path = %path.display());
        }
        None => {
            let data = to_pretty_json(&schema)?;
            std::io::stdout()
                .write_all(&data)
                .map_err(OutputError::from)?;
        }
    }

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);

    Ok(())
}

fn list_dialects(registry: &ExtractorRegistry) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    for key in registry.registered() {
        writeln!(stdout, "{key}").map_err(OutputError::from)?;
    }
    Ok(())
}
