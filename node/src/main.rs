// Copyright (c) 2026 Hashchain Contributors. MIT License.
// See LICENSE for details.

//! # Hashchain Node
//!
//! Entry point for the `hashchain-node` binary. Parses CLI arguments,
//! initializes logging and metrics, creates the ledger, and serves the
//! HTTP API.
//!
//! Subcommands:
//!
//! - `run`: serve the ledger over HTTP until interrupted
//! - `demo`: mine a few sample transfers and print the ledger
//! - `version`: print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;

use hashchain::service::BlockRow;
use hashchain::{Block, Chain, LedgerConfig, LedgerService, Record};

use cli::{Commands, NodeCli};
use logging::LogFormat;
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = NodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Demo(args) => run_demo(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Serve the ledger API and the metrics endpoint until a shutdown signal.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        "hashchain_node=info,hashchain=info,tower_http=debug",
        LogFormat::from_str_lossy(&args.log_format),
    );

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => LedgerConfig {
            difficulty: args.difficulty,
            creator_id: args.creator_id,
            ..LedgerConfig::default()
        },
    };

    tracing::info!(
        api_port = args.api_port,
        metrics_port = args.metrics_port,
        difficulty = config.difficulty,
        creator_id = config.creator_id,
        "starting hashchain-node"
    );

    // --- Ledger ---
    let ledger = Arc::new(LedgerService::new(config).context("invalid ledger configuration")?);

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new().context("failed to register metrics")?);
    node_metrics.chain_height.set(ledger.height() as i64);
    node_metrics.difficulty.set(ledger.difficulty() as i64);

    // --- Application state ---
    let app_state = api::AppState {
        version: env!("CARGO_PKG_VERSION").to_string(),
        ledger: Arc::clone(&ledger),
        metrics: Arc::clone(&node_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("{}:{}", args.bind, args.api_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("{}:{}", args.bind, args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!(height = ledger.height(), "hashchain-node stopped, chain discarded");
    Ok(())
}

/// Read a JSON ledger config from disk.
fn load_config(path: &Path) -> Result<LedgerConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = LedgerConfig::from_json(&raw)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    Ok(config)
}

/// Sample transfers used by the demo, cycled when more blocks are requested.
const DEMO_TRANSFERS: &[(&str, &str, f64)] = &[
    ("Alice", "Bob", 10.0),
    ("Bob", "Carol", 4.5),
    ("Carol", "Dave", 1.25),
    ("Dave", "Alice", 7.0),
];

/// Mine sample transfers on a local chain, print the table and the
/// validation result.
fn run_demo(args: cli::DemoArgs) -> Result<()> {
    logging::init_logging("hashchain=info", LogFormat::Pretty);

    if args.difficulty > hashchain::config::HASH_HEX_LENGTH {
        anyhow::bail!(
            "difficulty {} can never be met by a {}-digit hash",
            args.difficulty,
            hashchain::config::HASH_HEX_LENGTH
        );
    }

    let mut chain = Chain::new(args.difficulty);
    for (sender, receiver, amount) in DEMO_TRANSFERS.iter().cycle().take(args.blocks) {
        let candidate = Block::new(
            Record::new(*sender, *receiver, *amount),
            hashchain::config::DEFAULT_CREATOR_ID,
        )
        .with_prev_hash(chain.tip().hash_block());
        let (block, report) = chain.mine(candidate).context("demo block could not be mined")?;
        tracing::info!(
            attempts = report.attempts,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "mined demo block"
        );
        chain.push_mined(block);
    }

    if args.tamper && chain.len() > 1 {
        let last = chain.len() - 1;
        chain.blocks_mut()[last].prev_hash = "tampered".to_string();
    }

    print_table(chain.blocks());
    let outcome = chain.validate();
    println!();
    println!("valid: {}", outcome.is_valid());
    if let Some(index) = outcome.first_invalid_index() {
        println!("first broken link at block {}", index);
    }
    Ok(())
}

/// Print blocks as a fixed-width table on stdout.
fn print_table(blocks: &[Block]) {
    println!(
        "{:>3}  {:<10} {:<10} {:>10}  {:>7}  {:<16} {:<8}  {:>8}  {:<16}",
        "#", "sender", "receiver", "amount", "creator", "prev_hash", "time", "nonce", "hash"
    );
    for (i, block) in blocks.iter().enumerate() {
        let row = BlockRow::from_block(i, block);
        println!(
            "{:>3}  {:<10} {:<10} {:>10}  {:>7}  {:<16} {:<8}  {:>8}  {:<16}",
            row.index,
            row.sender,
            row.receiver,
            row.amount,
            row.creator_id,
            abbreviate(&row.prev_hash),
            row.timestamp,
            row.nonce,
            abbreviate(&row.hash),
        );
    }
}

/// First 16 characters of a hash, for display.
fn abbreviate(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}

/// Print version information to stdout.
fn print_version() {
    println!("hashchain-node {}", env!("CARGO_PKG_VERSION"));
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
