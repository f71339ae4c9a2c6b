use analytics::{AnalyticsEngine, AnalyticsReport};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use configuration::{Config, ForecastBasis, LoggingSettings, load_config};
use core_types::PriceTable;
use forecast::{ForecastEngine, ForecastRequest};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod render;

/// The main entry point for the Bankscope analytics application.
fn main() -> Result<()> {
    // A missing .env file is fine; it only supplies optional overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, config),
        Commands::Forecast(args) => handle_forecast(args, config),
        Commands::Distribution(args) => handle_distribution(args, config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Return, volatility and Monte Carlo forecast analytics for equity closing prices.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to ./config.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute returns, cumulative returns, rolling volatility and moving averages.
    Analyze(AnalyzeArgs),
    /// Project an instrument's price with a Monte Carlo simulation.
    Forecast(ForecastArgs),
    /// Show the histogram of an instrument's daily returns.
    Distribution(DistributionArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// CSV file with a date column and one closing-price column per instrument.
    #[arg(long)]
    prices: PathBuf,

    /// Restrict the analysis to one instrument (e.g., "BMO.TO").
    #[arg(long)]
    instrument: Option<String>,

    /// Rolling volatility window, in returns.
    #[arg(long)]
    window: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Parser)]
struct ForecastArgs {
    /// CSV file with a date column and one closing-price column per instrument.
    #[arg(long)]
    prices: PathBuf,

    /// The instrument to forecast (e.g., "BMO.TO").
    #[arg(long)]
    instrument: String,

    /// Number of business days to project.
    #[arg(long)]
    horizon: Option<usize>,

    /// Number of simulated paths.
    #[arg(long)]
    simulations: Option<usize>,

    /// Fixed seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Project the closing price or the cumulative return.
    #[arg(long, value_enum)]
    basis: Option<ForecastBasis>,

    /// Simulate paths on the current thread only.
    #[arg(long)]
    sequential: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Parser)]
struct DistributionArgs {
    /// CSV file with a date column and one closing-price column per instrument.
    #[arg(long)]
    prices: PathBuf,

    /// The instrument whose returns are binned.
    #[arg(long)]
    instrument: String,

    /// Number of histogram bins.
    #[arg(long)]
    bins: Option<usize>,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs stderr logging filtered by `RUST_LOG` (default `info`), plus a
/// daily rolling file when `logging.directory` is configured.
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match &settings.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &settings.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

// ==============================================================================
// Command Handlers
// ==============================================================================

fn load_table(path: &Path) -> Result<PriceTable> {
    price_data::load_price_table(path)
        .with_context(|| format!("Failed to load prices from {}", path.display()))
}

fn handle_analyze(args: AnalyzeArgs, mut config: Config) -> Result<()> {
    if let Some(window) = args.window {
        config.analytics.volatility_window = window;
    }
    config.validate()?;

    let table = load_table(&args.prices)?;
    let engine = AnalyticsEngine::new();
    tracing::info!(
        instruments = table.len(),
        window = config.analytics.volatility_window,
        "Running analytics."
    );

    let report = match &args.instrument {
        Some(id) => {
            let prices = table
                .get(id)
                .with_context(|| format!("Instrument '{id}' is not in the price table"))?;
            let analytics = engine.analyze_instrument(id, prices, &config.analytics)?;
            AnalyticsReport {
                instruments: BTreeMap::from([(id.clone(), analytics)]),
            }
        }
        None => engine.analyze(&table, &config.analytics)?,
    };

    match args.format {
        OutputFormat::Table => println!("{}", render::summary_table(&report, &config.analytics)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn handle_forecast(args: ForecastArgs, mut config: Config) -> Result<()> {
    let settings = &mut config.forecast;
    if let Some(horizon) = args.horizon {
        settings.horizon_days = horizon;
    }
    if let Some(simulations) = args.simulations {
        settings.simulations = simulations;
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if let Some(basis) = args.basis {
        settings.basis = basis;
    }
    if args.sequential {
        settings.parallel = false;
    }
    config.validate()?;

    let table = load_table(&args.prices)?;
    let prices = table
        .get(&args.instrument)
        .with_context(|| format!("Instrument '{}' is not in the price table", args.instrument))?;

    let request = ForecastRequest::from_prices(&args.instrument, prices, &config.forecast)?;
    tracing::info!(
        instrument = %request.instrument,
        horizon_days = request.params.horizon_days,
        simulations = request.params.simulations,
        "Running forecast."
    );
    let result = ForecastEngine::from_settings(&config.forecast).run(&request)?;

    match args.format {
        OutputFormat::Table => {
            println!("{}", render::forecast_header(&request, &result));
            println!("{}", render::forecast_table(&result));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

fn handle_distribution(args: DistributionArgs, mut config: Config) -> Result<()> {
    if let Some(bins) = args.bins {
        config.analytics.histogram_bins = bins;
    }
    config.validate()?;

    let table = load_table(&args.prices)?;
    let prices = table
        .get(&args.instrument)
        .with_context(|| format!("Instrument '{}' is not in the price table", args.instrument))?;

    let engine = AnalyticsEngine::new();
    let returns = engine.compute_daily_returns(prices)?;
    let histogram = engine.return_histogram(&returns, config.analytics.histogram_bins)?;
    let stats = engine.return_stats(&returns)?;

    println!(
        "{} daily returns: {} observations, mean {:.5}, std {:.5}",
        args.instrument, stats.count, stats.mean, stats.std_dev
    );
    println!("{}", render::histogram_table(&histogram));
    Ok(())
}
