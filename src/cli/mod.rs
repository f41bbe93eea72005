//! Command-line interface.

mod progress;
pub mod render;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use console::style;
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, Settings};
use crate::models::DocumentId;
use crate::service::{DocumentService, HttpDocumentService};
use crate::services::{Session, SessionError};
use crate::store::{DocumentStore, StoreError};

/// Identify, analyze and summarize financial documents.
#[derive(Debug, Parser)]
#[command(name = "finsum", version, about)]
pub struct Cli {
    /// Base URL of the document service
    #[arg(long, global = true, env = "FINSUM_SERVICE_URL")]
    pub service_url: Option<String>,

    /// Maximum service calls in flight during batch operations
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Identify document types for a list of PDF URLs
    Identify {
        #[command(flatten)]
        input: UrlInput,

        /// Print the resulting state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Identify, analyze and summarize a list of PDF URLs
    Run {
        #[command(flatten)]
        input: UrlInput,

        /// Documents to summarize (default: every identified document)
        #[arg(long = "select", value_name = "URL", num_args = 1..)]
        select: Vec<String>,

        /// Stop after analysis
        #[arg(long)]
        skip_summary: bool,

        /// Print the resulting state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the service's current document status
    Status {
        /// Print the resulting state as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Where the URL list comes from. Reads stdin when neither flag is given.
#[derive(Debug, Args)]
pub struct UrlInput {
    /// Comma or newline separated PDF URLs
    #[arg(long, conflicts_with = "file")]
    pub urls: Option<String>,

    /// File containing comma or newline separated PDF URLs
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl UrlInput {
    fn read(&self) -> anyhow::Result<String> {
        if let Some(urls) = &self.urls {
            return Ok(urls.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read URL list from {}", path.display()));
        }
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read URL list from stdin")?;
        Ok(buf)
    }
}

/// Set up tracing on stderr. `RUST_LOG` wins over the verbosity flag.
pub fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "finsum=warn",
        1 => "finsum=info",
        _ => "finsum=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve settings from config files, then CLI flags.
pub async fn resolve_settings(cli: &Cli) -> Settings {
    let mut settings = load_settings().await;
    if let Some(url) = &cli.service_url {
        settings = settings.with_service_url(url);
    }
    if let Some(concurrency) = cli.concurrency {
        settings = settings.with_concurrency(concurrency);
    }
    settings
}

/// Run the parsed command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = resolve_settings(&cli).await;
    let service = HttpDocumentService::new(&settings)
        .with_context(|| format!("Failed to create client for {}", settings.service_url))?;

    match cli.command {
        Commands::Identify { input, json } => {
            let raw = input.read()?;
            let store = cmd_identify(service, &settings, &raw, json).await?;
            finish(&store, json)
        }
        Commands::Run {
            input,
            select,
            skip_summary,
            json,
        } => {
            let raw = input.read()?;
            let store = cmd_run(service, &settings, &raw, &select, skip_summary, json).await?;
            finish(&store, json)
        }
        Commands::Status { json } => {
            let store = cmd_status(service).await?;
            finish(&store, json)
        }
    }
}

async fn cmd_identify<S: DocumentService>(
    service: S,
    settings: &Settings,
    raw: &str,
    json: bool,
) -> anyhow::Result<DocumentStore> {
    let (tx, rx) = mpsc::unbounded_channel();
    let progress = progress::spawn_progress(rx, !json);
    let mut session = Session::new(service)
        .with_concurrency(settings.max_concurrent_requests)
        .with_events(tx);

    let outcome = session.submit_identification(raw).await;
    if outcome.attempted == 0 {
        bail!("No URLs given");
    }

    let store = session.into_store();
    let _ = progress.await;
    Ok(store)
}

async fn cmd_run<S: DocumentService>(
    service: S,
    settings: &Settings,
    raw: &str,
    select: &[String],
    skip_summary: bool,
    json: bool,
) -> anyhow::Result<DocumentStore> {
    let (tx, rx) = mpsc::unbounded_channel();
    let progress = progress::spawn_progress(rx, !json);
    let mut session = Session::new(service)
        .with_concurrency(settings.max_concurrent_requests)
        .with_events(tx);

    let outcome = session.submit_identification(raw).await;
    if outcome.attempted == 0 {
        bail!("No URLs given");
    }
    session.analyze_all().await;

    if select.is_empty() {
        session.select_all();
    } else {
        for raw_id in select {
            let Some(id) = DocumentId::normalize(raw_id) else {
                warn!(id = %raw_id, "ignoring unparseable selection");
                continue;
            };
            if !session.select(&id) {
                warn!(id = %id, "cannot select: document not identified");
            }
        }
    }

    if !skip_summary {
        if !session.can_summarize() {
            if !json {
                eprintln!(
                    "{} Summary not available: not every document has completed analysis",
                    style("!").yellow()
                );
            }
        } else {
            match session.summarize_selected().await {
                Ok(_) => {}
                Err(SessionError::Store(StoreError::NothingToSummarize)) => {
                    if !json {
                        eprintln!("{} No selected documents to summarize", style("!").yellow());
                    }
                }
                // Already recorded as a diagnostic and reported by progress.
                Err(SessionError::Service(_)) => {}
                Err(err) => return Err(err.into()),
            }
        }
    }

    let store = session.into_store();
    let _ = progress.await;
    Ok(store)
}

async fn cmd_status<S: DocumentService>(service: S) -> anyhow::Result<DocumentStore> {
    let mut session = Session::new(service);
    session
        .refresh_status()
        .await
        .context("Failed to fetch document status")?;
    Ok(session.into_store())
}

fn finish(store: &DocumentStore, json: bool) -> anyhow::Result<()> {
    let snapshot = store.snapshot();
    if json {
        render::print_json(&snapshot)
    } else {
        render::print_snapshot(&snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "finsum",
            "--concurrency",
            "3",
            "run",
            "--urls",
            "http://a.com/x.pdf, http://b.com/y.pdf",
            "--select",
            "http://a.com/x.pdf",
            "--skip-summary",
        ])
        .unwrap();

        assert_eq!(cli.concurrency, Some(3));
        match cli.command {
            Commands::Run {
                input,
                select,
                skip_summary,
                json,
            } => {
                assert_eq!(
                    input.urls.as_deref(),
                    Some("http://a.com/x.pdf, http://b.com/y.pdf")
                );
                assert_eq!(select, vec!["http://a.com/x.pdf".to_string()]);
                assert!(skip_summary);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_urls_and_file_conflict() {
        let result = Cli::try_parse_from([
            "finsum",
            "identify",
            "--urls",
            "http://a.com/x.pdf",
            "--file",
            "urls.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["finsum", "-vv", "status", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Status { json: true }));
    }

    #[test]
    fn test_read_inline_urls() {
        let input = UrlInput {
            urls: Some("http://a.com/x.pdf".into()),
            file: None,
        };
        assert_eq!(input.read().unwrap(), "http://a.com/x.pdf");
    }

    #[test]
    fn test_read_urls_from_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("urls.txt");
        std::fs::write(&path, "http://a.com/x.pdf\nhttp://b.com/y.pdf\n").unwrap();

        let input = UrlInput {
            urls: None,
            file: Some(path),
        };
        assert_eq!(input.read().unwrap(), "http://a.com/x.pdf\nhttp://b.com/y.pdf\n");
    }

    #[test]
    fn test_missing_url_file_is_an_error() {
        let input = UrlInput {
            urls: None,
            file: Some(PathBuf::from("/nonexistent/finsum/urls.txt")),
        };
        let err = input.read().unwrap_err();
        assert!(err.to_string().contains("Failed to read URL list"));
    }
}
