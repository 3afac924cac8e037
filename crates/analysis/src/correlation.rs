//! Correlation between daily sentiment and daily returns.

use newscorr_core::{AlignedObservation, Symbol};
use ordered_float::OrderedFloat;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::BTreeMap;

/// Label shown in the symbol column of the pooled row. Tickers may share it,
/// so the row is identified by [`CorrelationResult::pooled`], never by name.
pub const POOLED: &str = "ALL";

/// Correlation statistics for one ticker (or the pooled sample).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub symbol: Symbol,
    /// Set only on the row computed over every ticker combined.
    pub pooled: bool,
    /// Number of aligned (sentiment, return) pairs.
    pub observations: usize,
    /// Pearson correlation coefficient.
    pub pearson_r: Option<f64>,
    /// Two-sided p-value of `pearson_r` under the null of no correlation.
    pub p_value: Option<f64>,
    /// Spearman rank correlation.
    pub spearman_rho: Option<f64>,
}

/// Pearson correlation coefficient.
///
/// `None` for mismatched lengths, fewer than two points, or a constant input.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Ordinary least-squares `(slope, intercept)` of `y` on `x`.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let (cov, var_x) = x.iter().zip(y).fold((0.0, 0.0), |(c, v), (xi, yi)| {
        (c + (xi - mean_x) * (yi - mean_y), v + (xi - mean_x).powi(2))
    });
    if var_x == 0.0 {
        return None;
    }
    let slope = cov / var_x;
    Some((slope, mean_y - slope * mean_x))
}

/// Spearman rank correlation (Pearson over average ranks).
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    pearson(&rank(x), &rank(y))
}

/// 1-based ranks; tied values share the average of their positions.
fn rank(values: &[f64]) -> Vec<f64> {
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by_key(|&(_, v)| OrderedFloat(v));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < indexed.len() {
        let mut j = i;
        while j + 1 < indexed.len() && indexed[j + 1].1 == indexed[i].1 {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for item in &indexed[i..=j] {
            ranks[item.0] = avg;
        }
        i = j + 1;
    }
    ranks
}

/// Two-sided p-value for a Pearson `r` over `n` pairs (Student's t, n - 2 df).
pub fn p_value(r: f64, n: usize) -> Option<f64> {
    if n < 3 || !r.is_finite() {
        return None;
    }
    if r.abs() >= 1.0 {
        return Some(0.0);
    }

    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

fn summarize(
    symbol: Symbol,
    pooled: bool,
    obs: &[&AlignedObservation],
    min_observations: usize,
) -> CorrelationResult {
    let mut result = CorrelationResult {
        symbol,
        pooled,
        observations: obs.len(),
        pearson_r: None,
        p_value: None,
        spearman_rho: None,
    };
    if obs.len() < min_observations {
        return result;
    }

    let x: Vec<f64> = obs.iter().map(|o| o.sentiment).collect();
    let y: Vec<f64> = obs.iter().map(|o| o.daily_return).collect();
    result.pearson_r = pearson(&x, &y);
    result.p_value = result.pearson_r.and_then(|r| p_value(r, obs.len()));
    result.spearman_rho = spearman(&x, &y);
    result
}

/// Per-ticker correlations, ordered by ticker, followed by the pooled row.
///
/// Tickers with fewer than `min_observations` pairs are reported with
/// undefined statistics.
pub fn correlate(observations: &[AlignedObservation], min_observations: usize) -> Vec<CorrelationResult> {
    let mut by_symbol: BTreeMap<&str, Vec<&AlignedObservation>> = BTreeMap::new();
    for obs in observations {
        by_symbol.entry(obs.symbol.as_str()).or_default().push(obs);
    }

    let mut results: Vec<CorrelationResult> = by_symbol
        .into_iter()
        .map(|(symbol, obs)| summarize(symbol.to_string(), false, &obs, min_observations))
        .collect();

    let all: Vec<&AlignedObservation> = observations.iter().collect();
    results.push(summarize(POOLED.to_string(), true, &all, min_observations));
    results
}
