//! Per-symbol financial metrics.
//!
//! Annualized return and volatility from daily simple returns, an
//! approximate Sharpe ratio (no risk-free rate) and maximum drawdown of the
//! close series.

use chrono::NaiveDate;
use newscorr_core::{Symbol, SymbolIndicators};
use serde::Serialize;
use tracing::debug;

/// Performance summary for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialMetrics {
    /// Ticker.
    pub symbol: Symbol,
    /// First bar date.
    pub start_date: Option<NaiveDate>,
    /// Last bar date.
    pub end_date: Option<NaiveDate>,
    /// (1 + mean daily return)^T - 1.
    pub annualized_return: Option<f64>,
    /// Sample std of daily returns * sqrt(T).
    pub annualized_volatility: Option<f64>,
    /// Annualized return / annualized volatility.
    pub sharpe_ratio: Option<f64>,
    /// Largest peak-to-trough decline as a positive fraction.
    pub max_drawdown: Option<f64>,
    /// Last close / first close - 1.
    pub total_return: Option<f64>,
    /// Number of bars.
    pub observations: usize,
}

/// Drawdown curve point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub peak: f64,
    /// (peak - close) / peak.
    pub drawdown: f64,
}

/// Metrics calculator.
pub struct MetricsCalculator {
    trading_days: u32,
}

impl MetricsCalculator {
    /// Create a calculator annualizing over `trading_days` periods.
    pub fn new(trading_days: u32) -> Self {
        Self { trading_days }
    }

    /// Calculate metrics from a ticker's indicator rows.
    pub fn calculate(&self, series: &SymbolIndicators) -> FinancialMetrics {
        let mut metrics = FinancialMetrics {
            symbol: series.symbol.clone(),
            start_date: series.rows.first().map(|r| r.date),
            end_date: series.rows.last().map(|r| r.date),
            observations: series.rows.len(),
            ..FinancialMetrics::default()
        };

        let returns: Vec<f64> = series.rows.iter().filter_map(|r| r.daily_return).collect();
        if returns.is_empty() {
            debug!(symbol = %series.symbol, "no returns; metrics undefined");
            return metrics;
        }

        let periods = f64::from(self.trading_days);
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        metrics.annualized_return = Some((1.0 + mean).powf(periods) - 1.0);
        metrics.annualized_volatility = sample_std(&returns).map(|s| s * periods.sqrt());
        metrics.sharpe_ratio = match (metrics.annualized_return, metrics.annualized_volatility) {
            (Some(ret), Some(vol)) if vol > 0.0 => Some(ret / vol),
            _ => None,
        };

        let curve = self.drawdown_curve(series);
        metrics.max_drawdown = curve.iter().map(|p| p.drawdown).reduce(f64::max);

        if let (Some(first), Some(last)) = (series.rows.first(), series.rows.last()) {
            if first.close != 0.0 {
                metrics.total_return = Some(last.close / first.close - 1.0);
            }
        }

        metrics
    }

    /// Calculate metrics for every ticker.
    pub fn calculate_all(&self, series: &[SymbolIndicators]) -> Vec<FinancialMetrics> {
        series.iter().map(|s| self.calculate(s)).collect()
    }

    /// Running peak and drawdown of the close series.
    pub fn drawdown_curve(&self, series: &SymbolIndicators) -> Vec<DrawdownPoint> {
        let mut curve = Vec::with_capacity(series.rows.len());
        let mut peak = f64::NEG_INFINITY;

        for row in &series.rows {
            peak = peak.max(row.close);
            let drawdown = if peak > 0.0 {
                (peak - row.close) / peak
            } else {
                0.0
            };
            curve.push(DrawdownPoint {
                date: row.date,
                close: row.close,
                peak,
                drawdown,
            });
        }

        curve
    }
}

/// Sample standard deviation (ddof = 1); `None` below two values.
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}
