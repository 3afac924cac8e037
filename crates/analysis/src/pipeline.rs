//! Pipeline orchestration.
//!
//! Runs the batch study end to end:
//! load CSVs -> indicators / sentiment -> align by date -> correlate -> plot + report.

use crate::alignment::{align, Alignment};
use crate::correlation::{correlate, CorrelationResult};
use crate::metrics::{FinancialMetrics, MetricsCalculator};
use crate::plot::{plot_indicators, plot_pooled_sentiment_returns, plot_sentiment_returns};
use crate::report::{HeadlineSummary, ReportWriter, RunSummary};
use newscorr_core::{
    normalize_symbol, Config, DailySentiment, Error, PriceSeries, Result, SymbolIndicators,
};
use newscorr_features::{
    aggregate_daily, score_headlines, IndicatorEngine, SentimentScorer, SentimentThresholds,
    VaderScorer,
};
use newscorr_ingestion::{load_price_dir, NewsLoader};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use tracing::{info, warn};

/// Output of the price-only path.
#[derive(Debug, Clone)]
pub struct IndicatorReport {
    pub indicators: Vec<SymbolIndicators>,
    pub metrics: Vec<FinancialMetrics>,
    /// Charts written (empty when plotting is disabled).
    pub figures: Vec<PathBuf>,
}

/// Output of a full run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub indicators: IndicatorReport,
    pub daily_sentiment: Vec<DailySentiment>,
    pub alignment: Alignment,
    pub correlations: Vec<CorrelationResult>,
    pub summary: RunSummary,
    /// Scatter charts written (empty when plotting is disabled).
    pub figures: Vec<PathBuf>,
}

impl PipelineOutput {
    /// Correlation over every ticker combined.
    pub fn pooled(&self) -> Option<&CorrelationResult> {
        self.correlations.iter().find(|c| c.pooled)
    }
}

struct SentimentStage {
    daily: Vec<DailySentiment>,
    headlines: HeadlineSummary,
}

/// Sentiment/returns study runner.
pub struct Pipeline {
    config: Config,
    engine: IndicatorEngine,
    metrics: MetricsCalculator,
    scorer: Box<dyn SentimentScorer>,
}

impl Pipeline {
    /// Create a pipeline scoring headlines with VADER.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let trading_days = config.analysis.trading_days_per_year;
        Ok(Self {
            engine: IndicatorEngine::new(&config.indicators, trading_days),
            metrics: MetricsCalculator::new(trading_days),
            scorer: Box::new(VaderScorer::new()),
            config,
        })
    }

    /// Replace the headline scorer.
    pub fn with_scorer(mut self, scorer: impl SentimentScorer + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Requested tickers, normalized. Empty means no restriction.
    fn symbol_filter(&self) -> HashSet<String> {
        self.config
            .data
            .symbols
            .iter()
            .map(|s| normalize_symbol(s))
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn load_prices(&self) -> Result<Vec<PriceSeries>> {
        let mut series = load_price_dir(&self.config.data.price_dir)?;

        let wanted = self.symbol_filter();
        if !wanted.is_empty() {
            series.retain(|s| wanted.contains(&s.symbol));
            let found: HashSet<&str> = series.iter().map(|s| s.symbol.as_str()).collect();
            let missing: BTreeSet<&str> = wanted
                .iter()
                .map(String::as_str)
                .filter(|s| !found.contains(s))
                .collect();
            if !missing.is_empty() {
                warn!(?missing, "requested tickers have no price file");
            }
        }

        series.retain(|s| {
            if s.is_empty() {
                warn!(symbol = %s.symbol, "price file has no rows; skipping");
            }
            !s.is_empty()
        });

        if series.is_empty() {
            return Err(Error::insufficient_data(format!(
                "no usable price series in {}",
                self.config.data.price_dir.display()
            )));
        }
        Ok(series)
    }

    fn report_writer(&self) -> Result<Option<ReportWriter>> {
        if self.config.output.reports {
            ReportWriter::new(&self.config.output.report_dir).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Price-only path: indicators, metrics, indicator charts, reports.
    pub fn run_indicators(&self) -> Result<IndicatorReport> {
        let series = self.load_prices()?;
        info!(
            symbols = series.len(),
            method = ?self.config.indicators.method,
            "computing indicators"
        );

        let indicators = self.engine.compute_all(&series);
        let metrics = self.metrics.calculate_all(&indicators);
        for m in &metrics {
            info!(
                symbol = %m.symbol,
                observations = m.observations,
                annualized_return = ?m.annualized_return,
                annualized_volatility = ?m.annualized_volatility,
                sharpe_ratio = ?m.sharpe_ratio,
                max_drawdown = ?m.max_drawdown,
                "financial metrics"
            );
        }

        let mut figures = Vec::new();
        if self.config.output.plots {
            for s in &indicators {
                figures.push(plot_indicators(s, &self.config.output.figure_dir)?);
            }
            info!(
                charts = figures.len(),
                dir = %self.config.output.figure_dir.display(),
                "wrote indicator charts"
            );
        }

        if let Some(writer) = self.report_writer()? {
            writer.write_indicators(&indicators)?;
            writer.write_metrics(&metrics)?;
        }

        Ok(IndicatorReport {
            indicators,
            metrics,
            figures,
        })
    }

    fn sentiment_stage(&self) -> Result<SentimentStage> {
        let tz = self.config.sentiment.timezone()?;
        let mut loader = NewsLoader::new(tz);
        let mut records = loader.load(&self.config.data.news_path)?;
        let stats = loader.stats().clone();

        let wanted = self.symbol_filter();
        if !wanted.is_empty() {
            records.retain(|r| wanted.contains(&r.stock));
        }

        let thresholds = SentimentThresholds::from(&self.config.sentiment);
        let scored = score_headlines(self.scorer.as_ref(), thresholds, &records);
        let daily = aggregate_daily(&scored);

        info!(
            rows = stats.total_rows,
            skipped = stats.skipped(),
            scored = scored.len(),
            days = daily.len(),
            "scored news headlines"
        );

        Ok(SentimentStage {
            headlines: HeadlineSummary {
                rows: stats.total_rows,
                skipped: stats.skipped(),
                scored: scored.len(),
                sentiment_days: daily.len(),
            },
            daily,
        })
    }

    /// News-only path: score headlines and write `daily_sentiment.csv`.
    pub fn run_sentiment(&self) -> Result<Vec<DailySentiment>> {
        let stage = self.sentiment_stage()?;
        if let Some(writer) = self.report_writer()? {
            writer.write_daily_sentiment(&stage.daily)?;
        }
        Ok(stage.daily)
    }

    /// Full study.
    pub fn run(&self) -> Result<PipelineOutput> {
        let indicators = self.run_indicators()?;
        let stage = self.sentiment_stage()?;

        let lag = self.config.analysis.return_lag_days;
        let alignment = align(&stage.daily, &indicators.indicators, lag);
        if alignment.observations.is_empty() {
            warn!(
                sentiment_days = stage.daily.len(),
                "no sentiment day matched a trading day with a return"
            );
        }

        let correlations = correlate(
            &alignment.observations,
            self.config.analysis.min_observations,
        );
        for c in &correlations {
            info!(
                symbol = %c.symbol,
                observations = c.observations,
                pearson_r = ?c.pearson_r,
                p_value = ?c.p_value,
                spearman_rho = ?c.spearman_rho,
                "sentiment/return correlation"
            );
        }

        let mut figures = Vec::new();
        if self.config.output.plots && !alignment.observations.is_empty() {
            let dir = &self.config.output.figure_dir;
            for c in correlations.iter().filter(|c| !c.pooled && c.observations > 0) {
                let obs: Vec<_> = alignment
                    .observations
                    .iter()
                    .filter(|o| o.symbol == c.symbol)
                    .cloned()
                    .collect();
                figures.push(plot_sentiment_returns(&c.symbol, &obs, dir)?);
            }
            figures.push(plot_pooled_sentiment_returns(&alignment.observations, dir)?);
        }

        let summary = RunSummary {
            method: self.config.indicators.method,
            return_lag_days: lag,
            symbols: indicators
                .indicators
                .iter()
                .map(|s| s.symbol.clone())
                .collect(),
            price_bars: indicators.indicators.iter().map(|s| s.rows.len()).sum(),
            headlines: stage.headlines,
            alignment: alignment.clone(),
            aligned_observations: alignment.observations.len(),
            pooled: correlations.iter().find(|c| c.pooled).cloned(),
        };

        if let Some(writer) = self.report_writer()? {
            writer.write_daily_sentiment(&stage.daily)?;
            writer.write_aligned(&alignment.observations)?;
            writer.write_correlations(&correlations)?;
            writer.write_summary(&summary)?;
            info!(dir = %writer.dir().display(), "wrote reports");
        }

        Ok(PipelineOutput {
            indicators,
            daily_sentiment: stage.daily,
            alignment,
            correlations,
            summary,
            figures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.indicators.macd_fast = 30;
        assert!(matches!(Pipeline::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_price_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data.price_dir = dir.path().join("nope");
        let pipeline = Pipeline::new(config).unwrap();
        assert!(pipeline.run_indicators().is_err());
    }

    #[test]
    fn test_symbol_filter_normalizes() {
        let mut config = Config::default();
        config.data.symbols = vec![" aapl ".to_string(), String::new()];
        let pipeline = Pipeline::new(config).unwrap();
        let filter = pipeline.symbol_filter();
        assert_eq!(filter.len(), 1);
        assert!(filter.contains("AAPL"));
    }
}
