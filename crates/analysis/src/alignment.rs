//! Date alignment of daily sentiment against daily returns.

use chrono::NaiveDate;
use newscorr_core::{AlignedObservation, DailySentiment, SymbolIndicators};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Joined observations plus counts of sentiment rows that found no partner.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Alignment {
    #[serde(skip)]
    pub observations: Vec<AlignedObservation>,
    /// Sentiment rows for tickers without price data.
    pub unmatched_symbol: usize,
    /// Sentiment rows dated on a day with no bar (weekends, holidays, out of range).
    pub non_trading_day: usize,
    /// Rows whose target bar has no return (first bar, or lag past the end).
    pub missing_return: usize,
}

/// Per-ticker lookup from date to row index.
struct DateIndex<'a> {
    series: &'a SymbolIndicators,
    by_date: HashMap<NaiveDate, usize>,
}

impl<'a> DateIndex<'a> {
    fn new(series: &'a SymbolIndicators) -> Self {
        let by_date = series
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.date, i))
            .collect();
        Self { series, by_date }
    }
}

/// Inner-join daily sentiment with returns on (ticker, date).
///
/// The return paired with a sentiment row is the one `lag` trading days
/// after the sentiment date; `lag = 0` pairs same-day returns.
pub fn align(daily: &[DailySentiment], indicators: &[SymbolIndicators], lag: usize) -> Alignment {
    let index: HashMap<&str, DateIndex<'_>> = indicators
        .iter()
        .map(|s| (s.symbol.as_str(), DateIndex::new(s)))
        .collect();

    let mut out = Alignment::default();
    for day in daily {
        let Some(idx) = index.get(day.symbol.as_str()) else {
            out.unmatched_symbol += 1;
            continue;
        };
        let Some(&pos) = idx.by_date.get(&day.date) else {
            out.non_trading_day += 1;
            continue;
        };
        let target = pos.checked_add(lag).and_then(|i| idx.series.rows.get(i));
        match target.and_then(|row| row.daily_return.map(|r| (row.date, r))) {
            Some((return_date, daily_return)) => out.observations.push(AlignedObservation {
                date: day.date,
                symbol: day.symbol.clone(),
                sentiment: day.mean_score,
                headline_count: day.headline_count,
                return_date,
                daily_return,
            }),
            None => out.missing_return += 1,
        }
    }

    debug!(
        aligned = out.observations.len(),
        unmatched_symbol = out.unmatched_symbol,
        non_trading_day = out.non_trading_day,
        missing_return = out.missing_return,
        lag,
        "aligned sentiment with returns"
    );
    out
}
