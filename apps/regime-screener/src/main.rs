//! Regime Screener Binary
//!
//! Screens tickers against a macro-economic regime and prints the result as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin regime-screener -- recession AAPL,MSFT,JPM
//! cargo run --bin regime-screener -- 2 JPM
//! ```
//!
//! The regime is a name (`expansion`, `inflation`, `stagflation`, `recession`),
//! its adjective form, or its index 0-3. A single ticker prints one outcome; a
//! list prints the combined report.
//!
//! # Environment Variables
//!
//! - `SCREENER_CONFIG`: Path to the YAML config (default: config.yaml)
//! - `OPENAI_API_KEY`: Referenced by the sample config for `llm.api_key`
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`

use std::path::Path;

use anyhow::{Context, bail};
use regime_screener::application::dto::ScreeningRequestDto;
use regime_screener::config::{Config, load_config, validate_startup_environment};
use regime_screener::infrastructure::config::DynContainer;
use regime_screener::observability::{init_metrics, init_tracing};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Default config path.
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Parsed command line.
struct Args {
    regime: String,
    tickers: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let args = parse_args()?;
    let config = read_config()?;

    init_tracing(&config.observability.logging.tracing())
        .context("failed to initialize tracing")?;

    tracing::info!(
        regime = %args.regime,
        tickers = %args.tickers,
        "Starting regime screener"
    );

    let validation = validate_startup_environment(&config)?;
    for warning in &validation.warnings {
        tracing::warn!(warning = %warning, "Startup validation");
    }

    if config.observability.metrics.enabled {
        init_metrics(&config.observability.metrics.exporter())
            .context("failed to start metrics exporter")?;
    }

    let container = DynContainer::from_config(&config)?;
    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let request = ScreeningRequestDto::from_csv(args.regime, &args.tickers);
    let output = if let [ticker] = request.tickers.as_slice() {
        let outcome = container
            .screen_ticker_use_case()
            .execute(&request.regime, ticker, &cancel)
            .await?;
        serde_json::to_string_pretty(&outcome)?
    } else {
        let report = container
            .screen_tickers_use_case()
            .execute(&request, &cancel)
            .await?;
        serde_json::to_string_pretty(&report)?
    };

    println!("{output}");
    tracing::info!("Regime screener finished");
    Ok(())
}

/// Read `<regime> <TICKER[,TICKER...]>` from the command line.
fn parse_args() -> anyhow::Result<Args> {
    let mut argv = std::env::args().skip(1);
    let (Some(regime), Some(tickers)) = (argv.next(), argv.next()) else {
        bail!("usage: regime-screener <regime> <TICKER[,TICKER...]>");
    };
    Ok(Args { regime, tickers })
}

/// Load the YAML config, or defaults when the default path is absent.
fn read_config() -> anyhow::Result<Config> {
    match std::env::var("SCREENER_CONFIG") {
        Ok(path) => load_config(Some(&path)).with_context(|| format!("loading {path}")),
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_config(Some(DEFAULT_CONFIG_PATH)).context("loading config.yaml")
        }
        Err(_) => Ok(Config::default()),
    }
}

/// Cancel the run on Ctrl-C.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, cancelling run");
                cancel.cancel();
            }
            Err(e) => tracing::error!(error = %e, "Failed to install Ctrl-C handler"),
        }
    });
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
