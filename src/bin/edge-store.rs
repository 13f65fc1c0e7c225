//! edge-store CLI: resolve store parameters, open the store, and poke at it.

use clap::{Parser, Subcommand};
use edge_store::config::{self, EnvSource, LogLevel, StoreArgs, ValueSourceExt};
use edge_store::store::{self, StoreHandle};
use edge_store::telemetry::{TelemetryConfig, init_telemetry};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "edge-store", about = "Open a store from flags or environment")]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve parameters, open the store and run a health check
    Check,
    /// Store a value under a key (SQL drivers only; mem:// ends with the process)
    Put { key: String, value: String },
    /// Print the value stored under a key (SQL drivers only)
    Get { key: String },
    /// Remove a key (SQL drivers only)
    Delete { key: String },
}

#[derive(Serialize)]
struct CheckSummary<'a> {
    driver: &'a str,
    prefix: &'a str,
    timeout_secs: u64,
    healthy: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let source = (&cli.store).or(EnvSource);

    // An unknown level leaves the default in place; it is reported once
    // logging is up.
    let (log_level, bad_level) = match config::resolve_log_level(&source) {
        Ok(level) => (level, None),
        Err(e) => (LogLevel::default(), Some(e)),
    };
    let _guard = init_telemetry(
        TelemetryConfig::new("edge-store", log_level)
            .with_endpoint(std::env::var("OTEL_ENDPOINT").ok()),
    )?;
    if let Some(e) = bad_level {
        tracing::warn!(error = %e, "keeping default log level");
    }

    let bundle = config::resolve(&source)?;
    tracing::debug!(prefix = %bundle.prefix, timeout = bundle.timeout, "resolved store parameters");

    let handle = store::open(&bundle).await?;
    let result = run(&handle, cli.command, bundle.timeout).await;
    handle.close().await;
    result
}

async fn run(handle: &StoreHandle, command: Command, timeout_secs: u64) -> anyhow::Result<()> {
    if !matches!(command, Command::Check) && !handle.driver().is_persistent() {
        anyhow::bail!(
            "{} stores do not outlive this process; use a SQL driver for put, get and delete",
            handle.driver()
        );
    }

    match command {
        Command::Check => {
            handle.health_check().await?;
            let summary = CheckSummary {
                driver: handle.driver().as_str(),
                prefix: handle.prefix(),
                timeout_secs,
                healthy: true,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Put { key, value } => {
            handle.put(&key, value.as_bytes()).await?;
            println!("Stored: {key}");
        }
        Command::Get { key } => match handle.get(&key).await? {
            Some(value) => println!("{}", String::from_utf8_lossy(&value)),
            None => anyhow::bail!("no value stored under '{key}'"),
        },
        Command::Delete { key } => {
            if handle.delete(&key).await? {
                println!("Deleted: {key}");
            } else {
                println!("Not found: {key}");
            }
        }
    }
    Ok(())
}
