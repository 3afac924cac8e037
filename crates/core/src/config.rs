//! Configuration structures for the newscorr pipeline.

use crate::error::{Error, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input locations.
    pub data: DataConfig,
    /// Technical indicator configuration.
    pub indicators: IndicatorConfig,
    /// Headline sentiment configuration.
    pub sentiment: SentimentConfig,
    /// Metrics and correlation configuration.
    pub analysis: AnalysisConfig,
    /// Output locations and switches.
    pub output: OutputConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing sections take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter consistency.
    pub fn validate(&self) -> Result<()> {
        let ind = &self.indicators;
        for (name, value) in [
            ("sma_period", ind.sma_period),
            ("ema_period", ind.ema_period),
            ("rsi_period", ind.rsi_period),
            ("macd_fast", ind.macd_fast),
            ("macd_slow", ind.macd_slow),
            ("macd_signal", ind.macd_signal),
        ] {
            if value == 0 {
                return Err(Error::config(format!("indicators.{name} must be positive")));
            }
        }
        if ind.volatility_window < 2 {
            return Err(Error::config("indicators.volatility_window must be at least 2"));
        }
        if ind.macd_fast >= ind.macd_slow {
            return Err(Error::config(format!(
                "indicators.macd_fast ({}) must be below macd_slow ({})",
                ind.macd_fast, ind.macd_slow
            )));
        }

        let s = &self.sentiment;
        if !(s.negative_threshold <= s.positive_threshold) {
            return Err(Error::config(format!(
                "sentiment.negative_threshold ({}) must not exceed positive_threshold ({})",
                s.negative_threshold, s.positive_threshold
            )));
        }
        s.timezone()?;

        if self.analysis.trading_days_per_year == 0 {
            return Err(Error::config("analysis.trading_days_per_year must be positive"));
        }
        if self.analysis.min_observations < 2 {
            return Err(Error::config("analysis.min_observations must be at least 2"));
        }
        Ok(())
    }
}

/// Input data locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Folder holding one OHLCV CSV per ticker.
    pub price_dir: PathBuf,
    /// News headline CSV.
    pub news_path: PathBuf,
    /// Restrict the run to these tickers (empty = every file found).
    pub symbols: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            price_dir: PathBuf::from("data/yfinance_data/Data"),
            news_path: PathBuf::from("data/raw_analyst_ratings.csv"),
            symbols: Vec::new(),
        }
    }
}

/// How indicator warm-up and smoothing are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorMethod {
    /// TA-Lib output conventions: undefined lookback, SMA-seeded EMA, Wilder RSI.
    #[default]
    TaLib,
    /// Rolling-window formulas: expanding SMA warm-up, first-value EMA seed,
    /// RSI from simple rolling means.
    Rolling,
}

/// Technical indicator parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Computation method.
    pub method: IndicatorMethod,
    /// Simple moving average window.
    pub sma_period: usize,
    /// Exponential moving average span.
    pub ema_period: usize,
    /// RSI period.
    pub rsi_period: usize,
    /// MACD fast EMA span.
    pub macd_fast: usize,
    /// MACD slow EMA span.
    pub macd_slow: usize,
    /// MACD signal EMA span.
    pub macd_signal: usize,
    /// Rolling volatility window (returns).
    pub volatility_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            method: IndicatorMethod::TaLib,
            sma_period: 20,
            ema_period: 20,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            volatility_window: 20,
        }
    }
}

/// Headline sentiment parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// IANA timezone news timestamps are normalized into before taking the date.
    pub market_timezone: String,
    /// Compound score at or above which a headline is positive.
    pub positive_threshold: f64,
    /// Compound score at or below which a headline is negative.
    pub negative_threshold: f64,
}

impl SentimentConfig {
    /// Parse the configured market timezone.
    pub fn timezone(&self) -> Result<Tz> {
        self.market_timezone.parse::<Tz>().map_err(|e| {
            Error::config(format!(
                "unknown market timezone {:?}: {e}",
                self.market_timezone
            ))
        })
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            market_timezone: "America/New_York".to_string(),
            positive_threshold: 0.05,
            negative_threshold: -0.05,
        }
    }
}

/// Metrics and correlation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Trading days used to annualize returns and volatility.
    pub trading_days_per_year: u32,
    /// Trading days between the sentiment date and the return it is paired with.
    pub return_lag_days: usize,
    /// Minimum aligned observations before a correlation is reported.
    pub min_observations: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trading_days_per_year: 252,
            return_lag_days: 0,
            min_observations: 3,
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where figures are written.
    pub figure_dir: PathBuf,
    /// Where CSV/JSON reports are written.
    pub report_dir: PathBuf,
    /// Render figures.
    pub plots: bool,
    /// Write CSV/JSON reports.
    pub reports: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            figure_dir: PathBuf::from("demo/figures"),
            report_dir: PathBuf::from("demo/reports"),
            plots: true,
            reports: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.indicators.sma_period, 20);
        assert_eq!(config.indicators.rsi_period, 14);
        assert_eq!(config.analysis.trading_days_per_year, 252);
        assert_eq!(config.indicators.method, IndicatorMethod::TaLib);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "indicators": { "method": "rolling", "rsi_period": 10 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.indicators.method, IndicatorMethod::Rolling);
        assert_eq!(config.indicators.rsi_period, 10);
        assert_eq!(config.indicators.macd_slow, 26);
        assert_eq!(config.sentiment.market_timezone, "America/New_York");
    }

    #[test]
    fn test_rejects_inverted_macd() {
        let mut config = Config::default();
        config.indicators.macd_fast = 30;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_timezone() {
        let mut config = Config::default();
        config.sentiment.market_timezone = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_crossed_thresholds() {
        let mut config = Config::default();
        config.sentiment.positive_threshold = -0.2;
        assert!(config.validate().is_err());
    }
}
