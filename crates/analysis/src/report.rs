//! CSV and JSON report files.

use crate::{alignment::Alignment, correlation::CorrelationResult, metrics::FinancialMetrics};
use chrono::NaiveDate;
use newscorr_core::{
    config::IndicatorMethod, AlignedObservation, DailySentiment, Result, SymbolIndicators,
};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One `indicators.csv` line. The row type carries no ticker, so it is
/// flattened here by hand.
#[derive(Serialize)]
struct IndicatorLine<'a> {
    symbol: &'a str,
    date: NaiveDate,
    close: f64,
    sma: Option<f64>,
    ema: Option<f64>,
    rsi: Option<f64>,
    macd: Option<f64>,
    macd_signal: Option<f64>,
    macd_hist: Option<f64>,
    daily_return: Option<f64>,
    volatility: Option<f64>,
}

/// Headline counters reported in `summary.json`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HeadlineSummary {
    /// Rows read from the news file.
    pub rows: usize,
    /// Rows dropped for empty fields or bad timestamps.
    pub skipped: usize,
    /// Headlines scored.
    pub scored: usize,
    /// Distinct (ticker, date) sentiment rows.
    pub sentiment_days: usize,
}

/// Contents of `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub method: IndicatorMethod,
    pub return_lag_days: usize,
    pub symbols: Vec<String>,
    pub price_bars: usize,
    pub headlines: HeadlineSummary,
    pub alignment: Alignment,
    pub aligned_observations: usize,
    /// Correlation over every ticker combined.
    pub pooled: Option<CorrelationResult>,
}

/// Writes report files into one directory.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Create the writer, creating `dir` if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_rows<T: Serialize>(&self, name: &str, rows: impl IntoIterator<Item = T>) -> Result<PathBuf> {
        let path = self.dir.join(name);
        let mut writer = csv::Writer::from_path(&path)?;
        let mut count = 0usize;
        for row in rows {
            writer.serialize(row)?;
            count += 1;
        }
        writer.flush()?;
        debug!(path = %path.display(), rows = count, "wrote report");
        Ok(path)
    }

    /// `indicators.csv`: one line per (ticker, bar).
    pub fn write_indicators(&self, indicators: &[SymbolIndicators]) -> Result<PathBuf> {
        let lines = indicators.iter().flat_map(|s| {
            s.rows.iter().map(move |r| IndicatorLine {
                symbol: &s.symbol,
                date: r.date,
                close: r.close,
                sma: r.sma,
                ema: r.ema,
                rsi: r.rsi,
                macd: r.macd,
                macd_signal: r.macd_signal,
                macd_hist: r.macd_hist,
                daily_return: r.daily_return,
                volatility: r.volatility,
            })
        });
        self.write_rows("indicators.csv", lines)
    }

    pub fn write_metrics(&self, metrics: &[FinancialMetrics]) -> Result<PathBuf> {
        self.write_rows("metrics.csv", metrics)
    }

    pub fn write_daily_sentiment(&self, daily: &[DailySentiment]) -> Result<PathBuf> {
        self.write_rows("daily_sentiment.csv", daily)
    }

    pub fn write_aligned(&self, observations: &[AlignedObservation]) -> Result<PathBuf> {
        self.write_rows("aligned.csv", observations)
    }

    pub fn write_correlations(&self, results: &[CorrelationResult]) -> Result<PathBuf> {
        self.write_rows("correlations.csv", results)
    }

    /// `summary.json`, pretty-printed.
    pub fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        let path = self.dir.join("summary.json");
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(file, summary)?;
        debug!(path = %path.display(), "wrote summary");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newscorr_core::IndicatorRow;
    use tempfile::tempdir;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, day).unwrap()
    }

    #[test]
    fn test_indicator_csv_has_symbol_column() {
        let dir = tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("reports")).unwrap();
        let series = SymbolIndicators {
            symbol: "MSFT".to_string(),
            rows: vec![IndicatorRow {
                date: date(1),
                close: 10.5,
                sma: None,
                ema: Some(10.25),
                rsi: None,
                macd: None,
                macd_signal: None,
                macd_hist: None,
                daily_return: None,
                volatility: None,
            }],
        };

        let path = writer.write_indicators(&[series]).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "symbol,date,close,sma,ema,rsi,macd,macd_signal,macd_hist,daily_return,volatility"
        );
        assert_eq!(lines.next().unwrap(), "MSFT,2021-03-01,10.5,,10.25,,,,,,");
    }

    #[test]
    fn test_daily_sentiment_csv() {
        let dir = tempdir().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();
        let daily = vec![DailySentiment {
            date: date(2),
            symbol: "AAPL".to_string(),
            mean_score: 0.25,
            headline_count: 2,
            positive: 1,
            neutral: 1,
            negative: 0,
        }];

        let path = writer.write_daily_sentiment(&daily).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("date,symbol,mean_score,headline_count,positive,neutral,negative"));
        assert!(text.contains("2021-03-02,AAPL,0.25,2,1,1,0"));
    }

    #[test]
    fn test_summary_json() {
        let dir = tempdir().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();
        let summary = RunSummary {
            method: IndicatorMethod::Rolling,
            return_lag_days: 1,
            symbols: vec!["AAPL".to_string()],
            price_bars: 40,
            headlines: HeadlineSummary::default(),
            alignment: Alignment::default(),
            aligned_observations: 0,
            pooled: None,
        };

        let path = writer.write_summary(&summary).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["method"], "rolling");
        assert_eq!(value["price_bars"], 40);
        assert_eq!(value["alignment"]["missing_return"], 0);
        assert!(value["alignment"].get("observations").is_none());
        assert!(value["pooled"].is_null());
    }
}
