mod cli;
mod demo_api;
mod overrides;
mod ticker;

use std::process::ExitCode;

use dry_common::DryError;
use dry_webview::Webview;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_DIRECTIVE: &str = "dry=info";

fn init_logging(directive: Option<&str>) {
    let directive = directive.unwrap_or(DEFAULT_LOG_DIRECTIVE);
    let filter = EnvFilter::from_default_env();
    let filter = match directive.parse() {
        Ok(d) => filter.add_directive(d),
        Err(e) => {
            eprintln!("invalid log directive {directive:?}: {e}");
            match DEFAULT_LOG_DIRECTIVE.parse() {
                Ok(d) => filter.add_directive(d),
                Err(_) => filter,
            }
        }
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(args: &cli::Args) -> Result<(), DryError> {
    let config = overrides::load(args)?;
    let config = overrides::apply(config, args)?;
    tracing::info!(
        title = %config.title,
        dispatch = ?config.bridge.dispatch,
        "Config loaded"
    );

    let webview = Webview::new(config)?;
    let sender = webview.message_sender();
    let webview = webview.with_api(demo_api::demo_api(sender.clone()));
    tracing::info!(functions = ?webview.api().names(), "Demo API registered");

    let ticker = match ticker::Ticker::spawn(sender, ticker::TICK_INTERVAL) {
        Ok(ticker) => Some(ticker),
        Err(e) => {
            tracing::warn!("Failed to start ticker: {e}");
            None
        }
    };

    tracing::info!("Entering event loop");
    let result = webview.run();
    if let Some(ticker) = ticker {
        ticker.stop();
    }
    result
}

fn main() -> ExitCode {
    let args = cli::parse();
    init_logging(args.log_level.as_deref());

    tracing::info!("dry v{} starting...", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
