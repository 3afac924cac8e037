//! Period-over-period returns.

/// Simple returns `p[i] / p[i-1] - 1`. The first entry, and any entry whose
/// previous price is zero or non-finite, is `None`.
pub fn pct_change(prices: &[f64]) -> Vec<Option<f64>> {
    returns_with(prices, |prev, cur| cur / prev - 1.0)
}

/// Log returns `ln(p[i] / p[i-1])`, same shape as [`pct_change`].
pub fn log_returns(prices: &[f64]) -> Vec<Option<f64>> {
    returns_with(prices, |prev, cur| (cur / prev).ln())
}

fn returns_with(prices: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(prices.windows(2).map(|w| {
        let (prev, cur) = (w[0], w[1]);
        if prev == 0.0 || !prev.is_finite() || !cur.is_finite() {
            return None;
        }
        Some(f(prev, cur)).filter(|r| r.is_finite())
    }));
    out
}
