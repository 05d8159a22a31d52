//! Library Desk - interactive library management console

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use library_desk::{
    config::{AppConfig, LoggingConfig},
    services::Services,
    shell::Shell,
    storage::CsvStorage,
};

/// Library management console.
#[derive(Parser)]
#[command(name = "library-desk", version, about = "Library management console")]
struct Cli {
    /// Directory holding the CSV data files.
    #[arg(long, env = "LIBRARY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Extra configuration file layered over config/default.
    #[arg(long, env = "LIBRARY_CONFIG")]
    config: Option<String>,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config =
        AppConfig::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }

    let _guard = init_tracing(&config.logging);

    tracing::info!("Starting Library Desk v{}", env!("CARGO_PKG_VERSION"));

    let storage = CsvStorage::new(config.storage.data_dir.clone());
    tracing::info!("Using data directory {}", storage.data_dir().display());
    let mut services = Services::load(storage, config.loans.clone())
        .context("Failed to load library data")?;

    let stdin = io::stdin();
    Shell::new(&mut services, stdin.lock(), io::stdout()).run()?;

    tracing::info!("Library Desk stopped");
    Ok(())
}

/// Install the subscriber. Logs go to stderr unless a log file is configured;
/// the returned guard flushes the file writer on drop.
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("library_desk={}", logging.level).into());

    let (writer, guard) = match &logging.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let prefix = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "library-desk.log".to_string());
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(directory, prefix));
            (tracing_subscriber::fmt::writer::BoxMakeWriter::new(writer), Some(guard))
        }
        None => (tracing_subscriber::fmt::writer::BoxMakeWriter::new(io::stderr), None),
    };

    let layer = tracing_subscriber::fmt::layer().with_writer(writer);
    let layer = match logging.format.as_str() {
        "json" => layer.json().boxed(),
        "compact" => layer.compact().boxed(),
        _ => layer.pretty().boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
    guard
}
