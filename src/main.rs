//! Grid Trader - Main Entry Point
//!
//! Runs one grid trading session per requested symbol against the exchange
//! price feed until Ctrl-C or until every session has exhausted its capital.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use grid_trader::common::traits::{Notifier, PriceFeed, TradeRecorder};
use grid_trader::config::{load_config, load_from_env, AppConfig};
use grid_trader::session::{SessionRegistry, SessionSettings};
use grid_trader::strategy::{FirstBuyReference, StrategyConfig};
use grid_trader::{ExchangeRestClient, LogNotifier, TelegramNotifier, TradeHistory};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file; flat environment variables are used when absent
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); defaults to the configured level
    #[arg(long)]
    log_level: Option<String>,

    /// Symbol to trade; repeat for several independent sessions
    #[arg(short, long = "symbol", default_value = "BTCUSDT")]
    symbols: Vec<String>,

    /// Strategy parameters as "<capital> <step> <drop%> <rise%>"
    #[arg(short, long)]
    params: Option<String>,

    /// Seconds between price checks
    #[arg(short, long)]
    interval: Option<u64>,

    /// Trade history file (json or csv, by configured format)
    #[arg(long)]
    history: Option<String>,

    /// Buy reference while no position is open (incoming-price, first-observed-price)
    #[arg(long)]
    first_buy_reference: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config = if Path::new(&args.config).exists() {
        load_config(Some(args.config.as_str()))?
    } else {
        load_from_env()?
    };
    let config = apply_overrides(config, &args)?;

    setup_logging(
        args.log_level.as_deref(),
        &config.settings.log_level,
        config.settings.log_file.as_deref(),
    )?;

    info!("Starting grid trader");
    info!("Configuration file: {}", args.config);

    let timeout = Duration::from_secs(config.settings.request_timeout_seconds);
    let feed: Arc<dyn PriceFeed> = Arc::new(ExchangeRestClient::from_config(&config.exchange, timeout)?);
    let recorder: Arc<dyn TradeRecorder> = Arc::new(TradeHistory::from_config(&config.history));
    let notifier = build_notifier(&config, timeout)?;
    info!(
        feed = feed.source_name(),
        notifier = notifier.channel_name(),
        "Collaborators initialized"
    );

    let registry = SessionRegistry::new(
        feed,
        recorder,
        notifier,
        SessionSettings::from(&config.settings),
    );

    for symbol in &args.symbols {
        let session_id = registry
            .create_session(symbol, config.strategy.clone())
            .await
            .with_context(|| format!("failed to start session for {}", symbol))?;
        info!(%session_id, %symbol, "Session running");
    }

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Received shutdown signal, cleaning up...");
        }
        _ = wait_until_idle(&registry) => {
            info!("All sessions have stopped");
        }
    }

    for status in registry.stop_all().await {
        let stats = registry.statistics(status.session_id).await?;
        println!("Session {} ({})", status.session_id, status.symbol);
        println!("{}", status);
        println!("{}", stats);
    }

    Ok(())
}

/// Fold command line overrides into the loaded configuration
fn apply_overrides(mut config: AppConfig, args: &Args) -> Result<AppConfig> {
    if let Some(params) = &args.params {
        let parsed: StrategyConfig = params.parse()?;
        config.strategy = parsed.with_first_buy_reference(config.strategy.first_buy_reference);
    }
    if let Some(reference) = &args.first_buy_reference {
        let reference: FirstBuyReference = reference.parse()?;
        config.strategy = config.strategy.with_first_buy_reference(reference);
    }
    if let Some(interval) = args.interval {
        config.settings.poll_interval_seconds = interval;
    }
    if let Some(history) = &args.history {
        config.history.enabled = true;
        config.history.path = history.clone();
    }
    Ok(config)
}

fn build_notifier(config: &AppConfig, timeout: Duration) -> Result<Arc<dyn Notifier>> {
    if let Some(telegram) = &config.telegram {
        if let Some(notifier) = TelegramNotifier::new(telegram, timeout)? {
            return Ok(Arc::new(notifier));
        }
    }
    warn!("No chat channel configured, session events go to the log");
    Ok(Arc::new(LogNotifier))
}

async fn wait_until_idle(registry: &SessionRegistry) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        if registry.running_count().await == 0 {
            break;
        }
    }
}

/// Console logging plus an optional plain-text log file
///
/// An explicit `--log-level` wins over `RUST_LOG`, which wins over the
/// configured level.
fn setup_logging(cli_level: Option<&str>, config_level: &str, log_file: Option<&str>) -> Result<()> {
    let directives = |level: &str| {
        format!("{},hyper=warn,reqwest=warn,rustls=warn", level.to_lowercase())
    };
    let env_filter = match cli_level {
        Some(level) => EnvFilter::try_new(directives(level)),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(directives(config_level))),
    }
    .unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let file_layer = match log_file {
        Some(path) => {
            let path = Path::new(path);
            let directory = path.parent().filter(|p| !p.as_os_str().is_empty());
            let directory = directory.unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(directory)?;
            let file_name = path
                .file_name()
                .context("log file path has no file name")?;
            let appender = tracing_appender::rolling::never(directory, file_name);

            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(appender)
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}
