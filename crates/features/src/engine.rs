//! Indicator computation engine.
//!
//! Combines all indicator components into one row per bar.

use crate::{
    indicators::{ema, macd, rsi, sma},
    returns::pct_change,
    rolling::RollingVolatility,
};
use newscorr_core::{
    config::IndicatorConfig, IndicatorRow, PriceSeries, SymbolIndicators,
};
use tracing::{debug, warn};

/// Indicator computation engine.
pub struct IndicatorEngine {
    /// Indicator parameters.
    config: IndicatorConfig,
    /// Periods per year used to annualize rolling volatility.
    trading_days: u32,
}

impl IndicatorEngine {
    /// Create a new engine from configuration.
    pub fn new(config: &IndicatorConfig, trading_days: u32) -> Self {
        Self {
            config: config.clone(),
            trading_days,
        }
    }

    /// Bars needed before every indicator is defined under the TA-Lib method.
    pub fn warmup(&self) -> usize {
        let c = &self.config;
        let macd = c.macd_slow + c.macd_signal - 1;
        [c.sma_period, c.ema_period, c.rsi_period + 1, macd, c.volatility_window + 1]
            .into_iter()
            .max()
            .unwrap_or_default()
    }

    /// Compute indicator rows for one ticker.
    pub fn compute(&self, series: &PriceSeries) -> SymbolIndicators {
        let c = &self.config;
        let closes = series.closes();

        if closes.len() < self.warmup() {
            warn!(
                symbol = %series.symbol,
                bars = closes.len(),
                warmup = self.warmup(),
                "series shorter than indicator warm-up; early values stay undefined"
            );
        }

        let sma = sma(&closes, c.sma_period, c.method);
        let ema = ema(&closes, c.ema_period, c.method);
        let rsi = rsi(&closes, c.rsi_period, c.method);
        let macd = macd(&closes, c.macd_fast, c.macd_slow, c.macd_signal, c.method);
        let returns = pct_change(&closes);

        let mut volatility = RollingVolatility::new(c.volatility_window, self.trading_days);

        let rows = series
            .bars
            .iter()
            .enumerate()
            .map(|(i, bar)| IndicatorRow {
                date: bar.date,
                close: bar.close,
                sma: sma[i],
                ema: ema[i],
                rsi: rsi[i],
                macd: macd.macd[i],
                macd_signal: macd.signal[i],
                macd_hist: macd.hist[i],
                daily_return: returns[i],
                volatility: volatility.add_price(bar.close),
            })
            .collect::<Vec<_>>();

        debug!(symbol = %series.symbol, rows = rows.len(), method = ?c.method, "computed indicators");

        SymbolIndicators {
            symbol: series.symbol.clone(),
            rows,
        }
    }

    /// Compute indicators for every ticker.
    pub fn compute_all(&self, series: &[PriceSeries]) -> Vec<SymbolIndicators> {
        series.iter().map(|s| self.compute(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use newscorr_core::{config::IndicatorMethod, PriceBar};

    fn make_series(n: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let bars = (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.5).sin() * 3.0 + i as f64 * 0.2;
                PriceBar {
                    date: start + Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    adj_close: None,
                    volume: 1_000.0,
                }
            })
            .collect();
        PriceSeries {
            symbol: "TEST".to_string(),
            bars,
        }
    }

    #[test]
    fn test_rows_match_bars() {
        let engine = IndicatorEngine::new(&IndicatorConfig::default(), 252);
        let out = engine.compute(&make_series(60));
        assert_eq!(out.symbol, "TEST");
        assert_eq!(out.rows.len(), 60);
        assert_eq!(out.rows[0].date.to_string(), "2020-01-01");
    }

    #[test]
    fn test_talib_warmup_regions() {
        let engine = IndicatorEngine::new(&IndicatorConfig::default(), 252);
        assert_eq!(engine.warmup(), 34);
        let rows = engine.compute(&make_series(60)).rows;

        assert!(rows[18].sma.is_none());
        assert!(rows[19].sma.is_some());
        assert!(rows[13].rsi.is_none());
        assert!(rows[14].rsi.is_some());
        assert!(rows[32].macd.is_none());
        assert!(rows[33].macd_signal.is_some());
        assert!(rows[0].daily_return.is_none());
        assert!(rows[19].volatility.is_none());
        assert!(rows[20].volatility.is_some());
    }

    #[test]
    fn test_rolling_method_defined_early() {
        let config = IndicatorConfig {
            method: IndicatorMethod::Rolling,
            ..IndicatorConfig::default()
        };
        let engine = IndicatorEngine::new(&config, 252);
        let rows = engine.compute(&make_series(30)).rows;

        assert!(rows[0].sma.is_some());
        assert!(rows[0].ema.is_some());
        assert!(rows[0].macd.is_some());
        assert!(rows[13].rsi.is_none());
        assert!(rows[14].rsi.is_some());
    }

    #[test]
    fn test_short_series_does_not_panic() {
        let engine = IndicatorEngine::new(&IndicatorConfig::default(), 252);
        let rows = engine.compute(&make_series(5)).rows;
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.macd.is_none()));
    }
}
