//! Drive Helper CLI - scan folders and manage item markers
//!
//! Usage:
//!   drive-helper classify <name>...
//!   drive-helper parse <page.html>
//!   drive-helper scan <folder-id>... [--pages <dir>] [--cookie <value>]
//!   drive-helper mark <item-id> <marker>
//!   drive-helper marks
//!   drive-helper clear-marks

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use drive_helper_core::render::chips_text;
use drive_helper_core::{
    classify, parse, Command, CommandOutcome, DirTransport, FileSnapshotStore, FolderResult,
    FolderStatus, HelperConfig, ListingTransport, Marker, MarkerStore, ScanObserver, ScanOutcome,
    ScanProgress, Session, StatusLevel, StatusSink,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "drive-helper")]
#[command(about = "Drive Helper - folder content counts and item markers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the content category of file names
    Classify {
        /// File names to classify
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Count file types in a saved listing page
    Parse {
        /// Listing page file
        file: PathBuf,
    },

    /// Count file types in folders, fetching their listings
    Scan {
        /// Folder ids to scan
        #[arg(required = true)]
        folders: Vec<String>,

        /// Read listings from <dir>/<folder-id>.html instead of the network
        #[arg(long)]
        pages: Option<PathBuf>,

        /// Cookie header forwarded with listing requests
        #[arg(long)]
        cookie: Option<String>,
    },

    /// Set the marker of an item (none, done, wait, star, warn, no)
    Mark {
        /// Item id
        item: String,

        /// Marker id
        marker: String,
    },

    /// List all markers
    Marks,

    /// Remove all markers
    ClearMarks,
}

/// Prints status lines and per-folder results to the terminal
struct TerminalReporter;

impl StatusSink for TerminalReporter {
    fn set_status(&self, level: StatusLevel, message: &str) {
        eprintln!("[{}] {}", level, message);
    }
}

impl ScanObserver for TerminalReporter {
    fn on_status(&self, level: StatusLevel, message: &str) {
        self.set_status(level, message);
    }

    fn on_folder(&self, result: &FolderResult) {
        match &result.status {
            FolderStatus::Done(summary) => println!("{:<40} {}", result.folder_id, chips_text(summary)),
            FolderStatus::Failed(reason) => println!("{:<40} ❌ {}", result.folder_id, reason),
        }
    }

    fn on_progress(&self, progress: ScanProgress) {
        tracing::debug!(
            processed = progress.processed,
            total = progress.total,
            "Scan {:.0}% done",
            progress.fraction() * 100.0
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => HelperConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => HelperConfig::default(),
    };
    tracing::debug!(?config, "Config loaded");

    match cli.command {
        Commands::Classify { names } => {
            for name in names {
                println!("{:<8} {}", classify(&name), name);
            }
            Ok(())
        }
        Commands::Parse { file } => parse_page(&file),
        Commands::Scan { folders, pages, cookie } => match pages {
            Some(dir) => scan(&config, DirTransport::new(dir), folders).await,
            None => scan_http(&config, cookie, folders).await,
        },
        Commands::Mark { item, marker } => set_marker(&config, &item, &marker),
        Commands::Marks => list_markers(&config),
        Commands::ClearMarks => {
            open_markers(&config)?.clear_all();
            println!("All markers removed");
            Ok(())
        }
    }
}

fn parse_page(file: &Path) -> Result<()> {
    let page = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let summary = parse(&page);

    println!("{}", chips_text(&summary));
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(feature = "http")]
async fn scan_http(config: &HelperConfig, cookie: Option<String>, folders: Vec<String>) -> Result<()> {
    let mut transport = drive_helper_core::HttpTransport::new(config.listing_base_url.clone())
        .context("Failed to create HTTP client")?;
    if let Some(cookie) = cookie {
        transport = transport.with_cookie(cookie);
    }
    scan(config, transport, folders).await
}

#[cfg(not(feature = "http"))]
async fn scan_http(_config: &HelperConfig, _cookie: Option<String>, _folders: Vec<String>) -> Result<()> {
    Err(anyhow::anyhow!(
        "HTTP feature is not enabled. Use --pages <dir> or rebuild drive-helper-cli with --features http"
    ))
}

async fn scan<T: ListingTransport>(config: &HelperConfig, transport: T, folders: Vec<String>) -> Result<()> {
    let storage = config
        .resolved_storage_dir()
        .context("Failed to resolve storage directory")?;
    let reporter = Arc::new(TerminalReporter);
    let session = Session::new(
        config,
        transport,
        FileSnapshotStore::new(storage),
        Arc::clone(&reporter) as Arc<dyn StatusSink>,
    );

    let start = Instant::now();
    let outcome = session.scan_with(&folders, reporter.as_ref()).await;

    if let ScanOutcome::Completed(report) = outcome {
        println!();
        println!(
            "{}/{} folders with content in {:.2}s",
            report.success,
            report.total,
            start.elapsed().as_secs_f64()
        );
    }

    // Markers of the scanned folders, if any
    let rows = folders
        .iter()
        .map(|id| drive_helper_core::RowDescriptor::folder(id.clone(), id.clone()))
        .collect();
    if let CommandOutcome::Rows(views) = session.dispatch(Command::ShowCached { rows }).await {
        for view in views.iter().filter(|v| v.marker != Marker::None) {
            println!("{} {}", view.marker.glyph(), view.item_id);
        }
    }

    Ok(())
}

fn open_markers(config: &HelperConfig) -> Result<MarkerStore<FileSnapshotStore>> {
    let storage = config
        .resolved_storage_dir()
        .context("Failed to resolve storage directory")?;
    Ok(MarkerStore::open(FileSnapshotStore::new(storage)))
}

fn set_marker(config: &HelperConfig, item: &str, marker: &str) -> Result<()> {
    let marker: Marker = marker.parse().context("Invalid marker")?;
    let mut markers = open_markers(config)?;
    markers.set(item, marker);

    let stats = markers.stats();
    println!("{} {} {}", marker.glyph(), marker.label(), item);
    println!("{}/{} marked", stats.done, stats.total);
    Ok(())
}

fn list_markers(config: &HelperConfig) -> Result<()> {
    let markers = open_markers(config)?;
    if markers.is_empty() {
        println!("No markers");
        return Ok(());
    }

    for (item, marker) in markers.iter() {
        println!("{} {:<10} {}", marker.glyph(), marker.label(), item);
    }
    let stats = markers.stats();
    println!();
    println!("{}/{} done", stats.done, stats.total);
    Ok(())
}
