//! appleverse-import - AppleVerse dataset import
//!
//! Replaces the apple accession catalogue with the contents of one dataset
//! file (CSV, JSON or Excel workbook), linking loose images to records on
//! the way. Prints a summary report on stdout.
//!
//! Exit code 1 when the source cannot be read, on any fatal import error,
//! or when no record was imported.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use appleverse_common::config::{load_toml_config, ROOT_FOLDER_ENV};
use appleverse_import::config::{parse_image_source, CliOverrides, ImportSettings};
use appleverse_import::models::ImportReport;
use appleverse_import::services::{locate_dataset, BulkImporter, ImageSource, ImportOptions};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for appleverse-import
#[derive(Parser, Debug)]
#[command(name = "appleverse-import")]
#[command(about = "Import the AppleVerse accession dataset")]
#[command(version)]
struct Args {
    /// Dataset file (default: the "final dataset" file in the data directory)
    file: Option<PathBuf>,

    /// Root folder holding data, images and the database
    #[arg(long, env = ROOT_FOLDER_ENV)]
    root_folder: Option<PathBuf>,

    /// Directory searched for the dataset file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Image directory and URL prefix as DIR=PREFIX (repeatable)
    #[arg(long = "image-dir", value_name = "DIR=PREFIX", value_parser = parse_image_source)]
    image_dirs: Vec<ImageSource>,

    /// Number of concurrent inserts per batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// SQLite database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG wins; otherwise the configured level is applied once the
    // TOML file has been read
    let initial_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, reload_handle) = reload::Layer::new(initial_filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let toml_config = load_toml_config(args.config.as_deref());

    let cli = CliOverrides {
        root_folder: args.root_folder.clone(),
        data_dir: args.data_dir.clone(),
        database_path: args.database.clone(),
        batch_size: args.batch_size,
        image_sources: args.image_dirs.clone(),
    };

    let result = match ImportSettings::resolve(&cli, &toml_config) {
        Ok(settings) => {
            if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
                if let Err(e) = reload_handle.reload(EnvFilter::new(&settings.log_level)) {
                    error!("Failed to apply configured log level: {}", e);
                }
            }
            run(args.file, settings).await
        }
        Err(e) => Err(anyhow::Error::new(e).context("Invalid configuration")),
    };

    match result {
        Ok(report) => {
            for line in report.summary_lines() {
                println!("{}", line);
            }
            if report.imported > 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("Import failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(file: Option<PathBuf>, settings: ImportSettings) -> Result<ImportReport> {
    info!("Starting appleverse-import");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let source = match file {
        Some(path) => path,
        None => locate_dataset(&settings.data_dir).context("No dataset file to import")?,
    };

    if let Some(parent) = settings.database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    info!("Database: {}", settings.database_path.display());
    let db_pool = appleverse_common::db::init_database(&settings.database_path)
        .await
        .context("Failed to open database")?;

    let importer = BulkImporter::new(
        db_pool.clone(),
        ImportOptions {
            batch_size: settings.batch_size,
            image_sources: settings.image_sources.clone(),
        },
    );

    let report = importer
        .import_file(&source)
        .await
        .with_context(|| format!("Import of {} failed", source.display()))?;

    db_pool.close().await;
    Ok(report)
}
