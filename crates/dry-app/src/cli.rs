use std::path::PathBuf;

use clap::Parser;

/// dry: open a window with an embedded webview and a demo host API.
#[derive(Parser, Debug)]
#[command(name = "dry", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// HTML file to show instead of the configured content.
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Window title override.
    #[arg(long)]
    pub title: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Run host functions on worker threads.
    #[arg(long)]
    pub worker: bool,

    /// Per-call timeout in milliseconds. Implies --worker.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

pub fn parse() -> Args {
    Args::parse()
}
