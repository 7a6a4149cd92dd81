//! faqbot server
//!
//! Loads the knowledge base, builds the immutable matching snapshot, and
//! serves the chat API over HTTP.

use anyhow::Result;
use clap::Parser;
use faqbot::config::Config;
use faqbot::diagnostics;
use faqbot::engine::{AnswerEngine, Snapshot};
use faqbot::kb::{self, KbSource, KnowledgeBase};
use faqbot::unanswered::UnansweredLog;
use faqbot::web::{self, AppState};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// faqbot - knowledge-base question answering server
#[derive(Parser, Debug)]
#[command(name = "faqbot_server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server listen address (overrides config)
    #[arg(short, long, value_name = "ADDR")]
    address: Option<String>,

    /// Knowledge base JSON file (overrides config)
    #[arg(short, long, value_name = "FILE")]
    kb: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate template config and exit
    #[arg(long, value_name = "FILE")]
    init: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    diagnostics::init_server_start_time();

    // Handle --init flag
    if let Some(init_path) = args.init {
        let path = if init_path.as_os_str().is_empty() {
            PathBuf::from("faqbot.toml")
        } else {
            init_path
        };

        if path.exists() {
            eprintln!("Error: Config file already exists: {}", path.display());
            eprintln!("Remove it first or choose a different path.");
            std::process::exit(1);
        }

        Config::write_template(&path)?;
        println!("Generated config file: {}", path.display());
        println!("\nEdit the file to configure the service, then start:");
        println!("  faqbot_server --config {}", path.display());
        return Ok(());
    }

    let config = load_config(&args)?;

    info!(
        address = %config.server.address,
        strategies = ?config.matching.strategies,
        "Configuration loaded"
    );

    let unanswered = UnansweredLog::open(&config.log.unanswered_path);
    let engine = AnswerEngine::from_config(&config.matching, unanswered)?;

    // Blocking single-threaded startup phase: load the knowledge base and
    // encode the semantic index. A failed load is loud but not fatal; the
    // service starts degraded and answers accordingly.
    let source = KbSource::from_config(&config.knowledge);
    let (knowledge, degraded) = match source.clone() {
        Some(load_source) => {
            // Source loading blocks on file, network, or database I/O
            let loaded = tokio::task::spawn_blocking(move || kb::load(&load_source)).await?;
            match loaded {
                Ok(knowledge) => (knowledge, false),
                Err(e) => {
                    error!(error = %e, "Knowledge base load failed, starting with empty knowledge base");
                    (KnowledgeBase::empty(), true)
                }
            }
        }
        None => {
            info!("No knowledge source configured, starting with empty knowledge base");
            (KnowledgeBase::empty(), false)
        }
    };

    info!(entries = knowledge.len(), "Building matching snapshot");
    let snapshot = Arc::new(Snapshot::build(knowledge, degraded));

    let state = AppState {
        snapshot: Arc::new(RwLock::new(snapshot)),
        engine: Arc::new(engine),
        source: source.map(Arc::new),
    };

    let router = web::create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.address).await?;

    info!(address = %config.server.address, "faqbot listening on http://{}", config.server.address);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!(error = %e, "HTTP server failed");
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let base_config = if let Some(ref config_path) = args.config {
        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found: {}\nUse --init {} to generate.",
                config_path.display(),
                config_path.display()
            );
        }
        info!(path = %config_path.display(), "Loading config");
        Config::from_file(config_path)?
    } else {
        match Config::from_default_locations()? {
            Some((config, path)) => {
                info!(path = %path.display(), "Loading config from default location");
                config
            }
            None => {
                info!("No config file found, using defaults");
                Config::default()
            }
        }
    };

    Ok(base_config.with_overrides(args.address.clone(), args.kb.clone()))
}
