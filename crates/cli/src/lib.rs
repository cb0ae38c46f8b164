//! Critique pipeline driver.
//!
//! ```text
//! host events ──► Pipeline ──► SelectionState (replaced wholesale)
//!                    │
//!  analyze-frames ───┼─► TreeSerializer ─► ContextAnalyzer ─► CritiqueClient ─┐
//!                    │                                                        │
//!                    │◄──────────── analysis-complete / analysis-error ◄──────┘
//!                    │
//!  focus-violation ──┴─► RelevanceScorer (live frames) ─► select + highlight
//! ```
//!
//! `critique serve` reads newline-delimited JSON events on stdin and writes
//! outbound messages on stdout. Logs go to stderr.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use critique_client::CritiqueClient;
use critique_protocol::Violation;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

mod config;
mod error;
mod events;
mod highlight;
mod host;
mod memory_host;
mod pipeline;
mod selection;

pub use config::{CritiqueConfig, CONFIG_ENV, ENDPOINT_ENV};
pub use error::{PipelineError, Result as PipelineResult};
pub use events::HostEvent;
pub use highlight::{HighlightConfig, HighlightGuard, Highlighter};
pub use host::{DesignHost, StrokeStyle};
pub use memory_host::{MemoryHost, Notification, HISTORY_LIMIT};
pub use pipeline::{Pipeline, DEFAULT_NOTIFY_TIMEOUT};
pub use selection::{SelectionHandle, SelectionState};

#[derive(Parser)]
#[command(name = "critique")]
#[command(about = "Design critique pipeline driver", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file, JSON or TOML (overrides CRITIQUE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process newline-delimited JSON events from stdin
    Serve(DocumentArgs),

    /// Print the request body that would be sent, without sending it
    Payload(AnalysisArgs),

    /// Run one analysis and print the outbound messages
    Analyze(AnalysisArgs),

    /// Resolve a critique report to a node of the selection
    Locate(LocateArgs),

    /// Print JSON schemas of the wire types
    Schema,
}

#[derive(Args)]
struct DocumentArgs {
    /// Document of raw design nodes (JSON object or array)
    #[arg(long)]
    document: PathBuf,

    /// Initial selection, by node id
    #[arg(long = "select", num_args = 1..)]
    select: Vec<String>,
}

#[derive(Args)]
struct AnalysisArgs {
    #[command(flatten)]
    doc: DocumentArgs,

    /// Free-text context passed to the analysis service
    #[arg(long)]
    context: Option<String>,

    /// Skip text blocks already present in the text sample
    #[arg(long)]
    ignore_repeated_text: bool,
}

#[derive(Args)]
struct LocateArgs {
    #[command(flatten)]
    doc: DocumentArgs,

    /// Critique report (a single violation object)
    #[arg(long)]
    report: PathBuf,
}

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    if let Commands::Schema = cli.command {
        return print_stdout(&serde_json::to_string_pretty(
            &critique_protocol::wire_schemas()?,
        )?);
    }

    let config = CritiqueConfig::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Serve(args) => run_serve(args, &config).await,
        Commands::Payload(args) => run_payload(args, &config),
        Commands::Analyze(args) => run_analyze(args, &config).await,
        Commands::Locate(args) => run_locate(args, &config).await,
        Commands::Schema => Ok(()),
    }
}

fn load_host(args: &DocumentArgs, echo: bool) -> Result<Arc<MemoryHost>> {
    let bytes = fs::read(&args.document)
        .with_context(|| format!("Failed to read {}", args.document.display()))?;
    let host = MemoryHost::from_document(&bytes)
        .with_context(|| format!("Invalid document {}", args.document.display()))?
        .with_echo(echo);
    host.select_ids(&args.select);
    Ok(Arc::new(host))
}

fn build_pipeline(host: Arc<MemoryHost>, config: &CritiqueConfig) -> Result<Pipeline> {
    let client = CritiqueClient::from_config(config.client.clone())
        .context("Failed to build analysis client")?;
    Ok(Pipeline::new(host, client, config))
}

async fn run_serve(args: DocumentArgs, config: &CritiqueConfig) -> Result<()> {
    let host = load_host(&args, true)?;
    let pipeline = build_pipeline(Arc::clone(&host), config)?;
    log::info!("serving events from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match HostEvent::parse(&line) {
            Ok(HostEvent::SelectionChange { ids }) => {
                host.select_ids(&ids);
                pipeline.on_selection_change(host.current_selection());
            }
            Ok(HostEvent::Command(command)) => {
                pipeline.handle(command).await;
                if host.is_closed() {
                    break;
                }
            }
            Err(err) => log::warn!("ignoring event: {err:#}"),
        }
    }

    pipeline.drain().await;
    Ok(())
}

fn run_payload(args: AnalysisArgs, config: &CritiqueConfig) -> Result<()> {
    let host = load_host(&args.doc, false)?;
    let pipeline = build_pipeline(host, config)?;
    let request = pipeline
        .prepare_request(args.context.as_deref(), args.ignore_repeated_text)
        .map_err(|err| anyhow::anyhow!(err.user_message()))?;
    print_stdout(&serde_json::to_string_pretty(&request)?)
}

async fn run_analyze(args: AnalysisArgs, config: &CritiqueConfig) -> Result<()> {
    let host = load_host(&args.doc, true)?;
    let pipeline = build_pipeline(host, config)?;
    pipeline.request_analysis(args.context.as_deref(), args.ignore_repeated_text);
    pipeline.drain().await;
    Ok(())
}

async fn run_locate(args: LocateArgs, config: &CritiqueConfig) -> Result<()> {
    let report = read_report(&args.report)?;
    let host = load_host(&args.doc, false)?;
    let pipeline = build_pipeline(Arc::clone(&host), config)?;

    let focused = pipeline.focus_violation(Some(&report)).await;
    let keywords = pipeline.scorer().keywords(&report);
    let notifications: Vec<String> = host
        .notifications()
        .into_iter()
        .map(|n| n.message)
        .collect();
    let out = json!({
        "keywords": keywords,
        "matched": focused,
        "selection": host.selection_ids(),
        "notifications": notifications,
    });
    print_stdout(&serde_json::to_string_pretty(&out)?)
}

fn read_report(path: &Path) -> Result<Violation> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("Invalid {}", path.display()))?;
    Violation::from_value(&value)
        .with_context(|| format!("{} is not a violation object", path.display()))
}
