use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use spendlens::analysis::{analyze_csv, build_client, validate_csv_file, UploadFile};
use spendlens::config::Config;
use spendlens::history::{format_date, HistoryStore, NewHistoryEntry};
use spendlens::report::generate_report;
use spendlens::storage::FileStorage;

#[derive(Parser)]
#[command(
    name = "spendlens",
    version,
    about = "Client for the galactic spend CSV aggregation service"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a CSV file and stream its aggregated highlights
    Analyze {
        /// Path to the CSV file
        path: PathBuf,
        /// Row limit forwarded to the aggregation endpoint
        #[arg(long)]
        rows: Option<u32>,
        /// Declared MIME type of the file (omitted: the MIME check is skipped)
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Manage the local history of past analyses
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Download a generated sample report
    Report {
        /// Relative size of the generated report
        #[arg(long)]
        size: Option<f64>,
        /// Write the report here instead of the server-suggested name
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List recorded analyses, newest first
    List,
    /// Remove one entry by id
    Remove { id: String },
    /// Delete all entries
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Analyze {
            path,
            rows,
            content_type,
        } => {
            if let Some(rows) = rows {
                config.rows = rows;
            }
            run_analysis(&config, &path, content_type).await
        }
        Commands::History { command } => run_history(&config, command),
        Commands::Report { size, output } => run_report(&config, size, output).await,
    }
}

fn open_history(config: &Config) -> anyhow::Result<HistoryStore<FileStorage>> {
    let storage = FileStorage::new(&config.storage_dir)
        .with_context(|| format!("failed to open storage at {}", config.storage_dir.display()))?;
    Ok(HistoryStore::with_key(storage, config.history_key.clone()))
}

async fn run_analysis(
    config: &Config,
    path: &Path,
    content_type: Option<String>,
) -> anyhow::Result<()> {
    let mut file = UploadFile::from_path(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    file.content_type = content_type;

    validate_csv_file(&file)?;

    let history = open_history(config)?;
    let client = build_client();
    let result = analyze_csv(&client, config, &file, |highlights| {
        for highlight in &highlights {
            println!("{}: {}", highlight.description, highlight.title);
        }
    })
    .await;

    match result {
        Ok(record) => {
            let has_results = record.is_some();
            history
                .add(NewHistoryEntry {
                    file_name: file.file_name,
                    highlights: record,
                })
                .context("analysis succeeded but recording it in history failed")?;
            if has_results {
                println!("Analysis complete.");
            } else {
                println!("Analysis complete, but the server returned no results.");
            }
            Ok(())
        }
        Err(e) => {
            history
                .add(NewHistoryEntry {
                    file_name: file.file_name,
                    highlights: None,
                })
                .context("recording the failed analysis in history failed")?;
            Err(e.into())
        }
    }
}

fn run_history(config: &Config, command: HistoryCommands) -> anyhow::Result<()> {
    let history = open_history(config)?;
    match command {
        HistoryCommands::List => {
            let entries = history.list();
            if entries.is_empty() {
                println!("No analyses recorded yet.");
                return Ok(());
            }
            for entry in entries {
                let status = if entry.is_success() {
                    "ok"
                } else {
                    "failed"
                };
                println!(
                    "{}  {}  {:6}  {}",
                    format_date(entry.timestamp),
                    entry.id,
                    status,
                    entry.file_name
                );
            }
            Ok(())
        }
        HistoryCommands::Remove { id } => {
            history.remove(&id)?;
            Ok(())
        }
        HistoryCommands::Clear => {
            history.clear()?;
            Ok(())
        }
    }
}

async fn run_report(
    config: &Config,
    size: Option<f64>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let client = build_client();
    let report = generate_report(&client, config, size).await?;

    let path = output.unwrap_or_else(|| PathBuf::from(&report.filename));
    std::fs::write(&path, &report.bytes)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    println!("Saved report to {} ({} bytes)", path.display(), report.bytes.len());
    Ok(())
}
