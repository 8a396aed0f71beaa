//! # CLI Interface
//!
//! Command-line arguments for `hashchain-node`, built with `clap` derive.
//! Three subcommands: `run`, `demo`, and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hashchain::config::{DEFAULT_API_PORT, DEFAULT_CREATOR_ID, DEFAULT_DIFFICULTY, DEFAULT_METRICS_PORT};

/// Hashchain ledger node.
///
/// Holds a single in-memory proof-of-work chain and serves it over HTTP.
/// The chain is lost when the process exits.
#[derive(Parser, Debug)]
#[command(
    name = "hashchain-node",
    about = "In-memory proof-of-work ledger node",
    version,
    propagate_version = true
)]
pub struct NodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API and metrics endpoint.
    Run(RunArgs),
    /// Mine a handful of sample transfers in-process and print the ledger.
    Demo(DemoArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to a JSON ledger config file.
    ///
    /// Values given on the command line are ignored when a file is supplied.
    #[arg(long, short = 'c', env = "HASHCHAIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind the API and metrics listeners on.
    #[arg(long, env = "HASHCHAIN_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// Port for the HTTP API.
    #[arg(long, env = "HASHCHAIN_API_PORT", default_value_t = DEFAULT_API_PORT)]
    pub api_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "HASHCHAIN_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// Starting proof-of-work difficulty (leading zero hex digits).
    #[arg(long, env = "HASHCHAIN_DIFFICULTY", default_value_t = DEFAULT_DIFFICULTY)]
    pub difficulty: usize,

    /// Creator id stamped on blocks submitted through the API.
    #[arg(long, env = "HASHCHAIN_CREATOR_ID", default_value_t = DEFAULT_CREATOR_ID)]
    pub creator_id: u64,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "HASHCHAIN_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Arguments for the `demo` subcommand.
#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Number of sample transfers to mine.
    #[arg(long, short = 'n', default_value_t = 3)]
    pub blocks: usize,

    /// Proof-of-work difficulty for the run.
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    pub difficulty: usize,

    /// Overwrite the last block's prev hash before validating.
    #[arg(long)]
    pub tamper: bool,
}
