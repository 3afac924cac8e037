//! Command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use newscorr_analysis::Pipeline;
use newscorr_core::config::IndicatorMethod;
use newscorr_core::Config;
use std::path::{Path, PathBuf};
use tracing::info;

/// Headline sentiment vs. daily stock returns.
#[derive(Parser)]
#[command(name = "newscorr")]
#[command(about = "Correlate financial news sentiment with daily stock returns")]
#[command(version)]
pub struct Cli {
    /// JSON configuration file (defaults apply to anything it omits)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the full study: indicators, sentiment, alignment, correlation
    Run(RunArgs),
    /// Compute indicators and metrics from price files only
    Indicators(PriceArgs),
    /// Score headlines and write daily sentiment
    Sentiment(SentimentArgs),
    /// Print the effective configuration as JSON
    Config,
}

/// Indicator computation method.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MethodArg {
    /// TA-Lib conventions
    TaLib,
    /// Rolling-window formulas
    Rolling,
}

impl From<MethodArg> for IndicatorMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::TaLib => IndicatorMethod::TaLib,
            MethodArg::Rolling => IndicatorMethod::Rolling,
        }
    }
}

/// Overrides shared by every price-reading command.
#[derive(Args)]
pub struct PriceArgs {
    /// Folder of per-ticker OHLCV CSVs
    #[arg(long)]
    pub price_dir: Option<PathBuf>,

    /// Restrict to these tickers (comma-separated)
    #[arg(long, short, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Chart output folder
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Report output folder
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Indicator method
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,

    /// Skip chart generation
    #[arg(long)]
    pub no_plots: bool,
}

impl PriceArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.price_dir {
            config.data.price_dir = dir.clone();
        }
        if !self.symbols.is_empty() {
            config.data.symbols = self.symbols.clone();
        }
        if let Some(dir) = &self.out_dir {
            config.output.figure_dir = dir.clone();
        }
        if let Some(dir) = &self.report_dir {
            config.output.report_dir = dir.clone();
        }
        if let Some(method) = self.method {
            config.indicators.method = method.into();
        }
        if self.no_plots {
            config.output.plots = false;
        }
    }
}

/// Arguments for the run command
#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub prices: PriceArgs,

    /// News headline CSV
    #[arg(long)]
    pub news: Option<PathBuf>,

    /// Trading days between headline date and paired return
    #[arg(long)]
    pub lag: Option<usize>,
}

/// Arguments for the sentiment command
#[derive(Args)]
pub struct SentimentArgs {
    /// News headline CSV
    #[arg(long)]
    pub news: Option<PathBuf>,

    /// Restrict to these tickers (comma-separated)
    #[arg(long, short, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Report output folder
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

/// Load the configuration file, or defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn pipeline(config: Config) -> Result<Pipeline> {
    Pipeline::new(config).context("invalid configuration")
}

/// Execute the run command
pub fn run(mut config: Config, args: RunArgs) -> Result<()> {
    args.prices.apply(&mut config);
    if let Some(news) = args.news {
        config.data.news_path = news;
    }
    if let Some(lag) = args.lag {
        config.analysis.return_lag_days = lag;
    }

    let output = pipeline(config)?.run().context("pipeline run failed")?;
    match output.pooled() {
        Some(pooled) => info!(
            observations = pooled.observations,
            pearson_r = ?pooled.pearson_r,
            p_value = ?pooled.p_value,
            "pooled sentiment/return correlation"
        ),
        None => info!("no pooled correlation"),
    }
    Ok(())
}

/// Execute the indicators command
pub fn indicators(mut config: Config, args: PriceArgs) -> Result<()> {
    args.apply(&mut config);
    let report = pipeline(config)?
        .run_indicators()
        .context("indicator run failed")?;
    info!(
        symbols = report.indicators.len(),
        charts = report.figures.len(),
        "indicators complete"
    );
    Ok(())
}

/// Execute the sentiment command
pub fn sentiment(mut config: Config, args: SentimentArgs) -> Result<()> {
    if let Some(news) = args.news {
        config.data.news_path = news;
    }
    if !args.symbols.is_empty() {
        config.data.symbols = args.symbols;
    }
    if let Some(dir) = args.report_dir {
        config.output.report_dir = dir;
    }

    let daily = pipeline(config)?
        .run_sentiment()
        .context("sentiment run failed")?;
    info!(days = daily.len(), "sentiment complete");
    Ok(())
}

/// Execute the config command
pub fn print_config(config: &Config) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
