//! Technical indicators over a close-price series.
//!
//! Every function returns one entry per input value; `None` marks the
//! warm-up region or an undefined value. Two conventions are supported:
//!
//! - [`IndicatorMethod::TaLib`]: undefined until the full lookback is
//!   available, EMAs seeded with the SMA of their first window, RSI with
//!   Wilder smoothing, MACD lines aligned on the slow EMA.
//! - [`IndicatorMethod::Rolling`]: expanding SMA during warm-up, EMAs
//!   seeded with the first value, RSI from simple rolling means.

use crate::rolling::RollingMean;
use newscorr_core::config::IndicatorMethod;

/// MACD line, signal line and histogram.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Macd {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub hist: Vec<Option<f64>>,
}

/// EMA smoothing factor for a span.
#[inline]
fn smoothing(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Simple moving average.
pub fn sma(values: &[f64], period: usize, method: IndicatorMethod) -> Vec<Option<f64>> {
    let mut window = RollingMean::new(period);
    values
        .iter()
        .map(|&v| {
            let full = window.push(v);
            match method {
                IndicatorMethod::TaLib => full,
                IndicatorMethod::Rolling => window.mean(),
            }
        })
        .collect()
}

/// Exponential moving average.
pub fn ema(values: &[f64], period: usize, method: IndicatorMethod) -> Vec<Option<f64>> {
    match method {
        IndicatorMethod::TaLib => ema_seeded(values, period, 0),
        IndicatorMethod::Rolling => ema_from_first(values, period),
    }
}

/// EMA seeded with the mean of `values[offset..offset + period]`; defined
/// from index `offset + period - 1`.
fn ema_seeded(values: &[f64], period: usize, offset: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    let seed_idx = offset + period - 1;
    if seed_idx >= values.len() {
        return out;
    }

    let k = smoothing(period);
    let mut prev = values[offset..=seed_idx].iter().sum::<f64>() / period as f64;
    out[seed_idx] = Some(prev);
    for i in (seed_idx + 1)..values.len() {
        prev = k * values[i] + (1.0 - k) * prev;
        out[i] = Some(prev);
    }
    out
}

/// Recursive EMA starting from the first value.
fn ema_from_first(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let k = smoothing(period);
    let mut prev: Option<f64> = None;
    values
        .iter()
        .map(|&v| {
            let next = match prev {
                Some(p) => k * v + (1.0 - k) * p,
                None => v,
            };
            prev = Some(next);
            prev
        })
        .collect()
}

/// Relative strength index.
pub fn rsi(values: &[f64], period: usize, method: IndicatorMethod) -> Vec<Option<f64>> {
    match method {
        IndicatorMethod::TaLib => rsi_wilder(values, period),
        IndicatorMethod::Rolling => rsi_rolling(values, period),
    }
}

fn gain_loss(prev: f64, cur: f64) -> (f64, f64) {
    let delta = cur - prev;
    (delta.max(0.0), (-delta).max(0.0))
}

fn rsi_wilder(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() <= period {
        return out;
    }

    let value = |gain: f64, loss: f64| {
        let total = gain + loss;
        if total != 0.0 {
            100.0 * gain / total
        } else {
            0.0
        }
    };

    let n = period as f64;
    let (mut avg_gain, mut avg_loss) = values[..=period]
        .windows(2)
        .map(|w| gain_loss(w[0], w[1]))
        .fold((0.0, 0.0), |(g, l), (dg, dl)| (g + dg, l + dl));
    avg_gain /= n;
    avg_loss /= n;
    out[period] = Some(value(avg_gain, avg_loss));

    for i in (period + 1)..values.len() {
        let (gain, loss) = gain_loss(values[i - 1], values[i]);
        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;
        out[i] = Some(value(avg_gain, avg_loss));
    }
    out
}

fn rsi_rolling(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut gains = RollingMean::new(period);
    let mut losses = RollingMean::new(period);
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);

    for w in values.windows(2) {
        let (gain, loss) = gain_loss(w[0], w[1]);
        let rsi = match (gains.push(gain), losses.push(loss)) {
            (Some(up), Some(down)) if down > 0.0 => Some(100.0 - 100.0 / (1.0 + up / down)),
            (Some(up), Some(_)) if up > 0.0 => Some(100.0),
            _ => None,
        };
        out.push(rsi);
    }
    out
}

/// Moving average convergence/divergence.
pub fn macd(
    values: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
    method: IndicatorMethod,
) -> Macd {
    match method {
        IndicatorMethod::TaLib => macd_aligned(values, fast, slow, signal),
        IndicatorMethod::Rolling => macd_rolling(values, fast, slow, signal),
    }
}

fn macd_aligned(values: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let len = values.len();
    let none = vec![None; len];
    if fast == 0 || signal == 0 || fast > slow || slow + signal < 2 || slow + signal - 2 >= len {
        return Macd {
            macd: none.clone(),
            signal: none.clone(),
            hist: none,
        };
    }

    // Both EMAs start at slow - 1; the fast one is seeded from the window ending there.
    let start = slow - 1;
    let fast_ema = ema_seeded(values, fast, slow - fast);
    let slow_ema = ema_seeded(values, slow, 0);

    let line: Vec<f64> = (start..len)
        .map(|i| match (fast_ema[i], slow_ema[i]) {
            (Some(f), Some(s)) => f - s,
            _ => f64::NAN,
        })
        .collect();
    let signal_line = ema_seeded(&line, signal, 0);

    let first = start + signal - 1;
    let mut out = Macd {
        macd: none.clone(),
        signal: none.clone(),
        hist: none,
    };
    for i in first..len {
        let m = line[i - start];
        if let Some(s) = signal_line[i - start] {
            out.macd[i] = Some(m);
            out.signal[i] = Some(s);
            out.hist[i] = Some(m - s);
        }
    }
    out
}

fn macd_rolling(values: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let fast_ema = ema_from_first(values, fast);
    let slow_ema = ema_from_first(values, slow);

    let line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => f - s,
            _ => f64::NAN,
        })
        .collect();
    let signal_line = ema_from_first(&line, signal);

    let macd: Vec<Option<f64>> = line.iter().map(|&m| Some(m).filter(|m| m.is_finite())).collect();
    let hist = macd
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        })
        .collect();

    Macd {
        macd,
        signal: signal_line,
        hist,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const TA: IndicatorMethod = IndicatorMethod::TaLib;
    const ROLL: IndicatorMethod = IndicatorMethod::Rolling;

    fn assert_series(actual: &[Option<f64>], expected: &[Option<f64>]) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            match (a, e) {
                (Some(a), Some(e)) => assert!((a - e).abs() < 1e-9, "index {i}: {a} != {e}"),
                (None, None) => {}
                _ => panic!("index {i}: {a:?} != {e:?}"),
            }
        }
    }

    /// 100 + 5 sin(i / 2) + 0.3 i, rounded to cents.
    const WAVE: [f64; 40] = [
        100.0, 102.7, 104.81, 105.89, 105.75, 104.49, 102.51, 100.35, 98.62, 97.81, 98.21, 99.77,
        102.2, 104.98, 107.48, 109.19, 109.75, 109.09, 107.46, 105.32, 103.28, 101.9, 101.6,
        102.52, 104.52, 107.17, 109.9, 112.12, 113.35, 113.37, 112.25, 110.33, 108.16, 106.34,
        105.39, 105.62, 107.05, 109.39, 112.15, 114.73,
    ];

    #[test]
    fn test_sma_talib_lookback() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, TA);
        assert_series(&out, &[None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_sma_rolling_expanding() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, ROLL);
        assert_series(&out, &[Some(1.0), Some(1.5), Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_ema_talib_seeded_with_sma() {
        // k = 0.5, seed = mean(1, 2, 3) = 2
        let out = ema(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, TA);
        assert_series(&out, &[None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_ema_rolling_first_value_seed() {
        let out = ema(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, ROLL);
        assert_series(
            &out,
            &[Some(1.0), Some(1.5), Some(2.25), Some(3.125), Some(4.0625)],
        );
    }

    #[test]
    fn test_ema_shorter_than_period() {
        assert!(ema(&[1.0, 2.0], 3, TA).iter().all(Option::is_none));
    }

    #[test]
    fn test_zero_period_is_undefined() {
        let values = [1.0, 2.0, 3.0];
        let out = ema(&values, 0, TA);
        assert_eq!(out, vec![None, None, None]);
        assert!(sma(&values, 0, TA).iter().all(Option::is_none));
        assert!(rsi(&values, 0, TA).iter().all(Option::is_none));
    }

    #[test]
    fn test_rsi_wilder_reference() {
        // Deltas: +1, -1, +2, +1
        // First: gain 1, loss 1/3 -> 75
        // Next: gain (1*2 + 1)/3 = 1, loss (1/3*2 + 0)/3 = 2/9 -> 100 * 9/11
        let out = rsi(&[10.0, 11.0, 10.0, 12.0, 13.0], 3, TA);
        assert_eq!(out[..3], [None, None, None]);
        assert_abs_diff_eq!(out[3].unwrap(), 75.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out[4].unwrap(), 900.0 / 11.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rsi_rolling_reference() {
        let out = rsi(&[10.0, 11.0, 10.0, 12.0, 13.0], 3, ROLL);
        assert_eq!(out[..3], [None, None, None]);
        assert_abs_diff_eq!(out[3].unwrap(), 75.0, epsilon = 1e-9);
        // Window (-1, +2, +1): up 1, down 1/3
        assert_abs_diff_eq!(out[4].unwrap(), 75.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rsi_edge_cases() {
        let rising: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_abs_diff_eq!(rsi(&rising, 14, TA)[19].unwrap(), 100.0);
        assert_abs_diff_eq!(rsi(&rising, 14, ROLL)[19].unwrap(), 100.0);

        let flat = vec![50.0; 20];
        assert_abs_diff_eq!(rsi(&flat, 14, TA)[19].unwrap(), 0.0);
        assert!(rsi(&flat, 14, ROLL)[19].is_none());
    }

    #[test]
    fn test_rsi_bounds() {
        let prices: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1)
            .collect();
        for method in [TA, ROLL] {
            for v in rsi(&prices, 14, method).into_iter().flatten() {
                assert!((0.0..=100.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_macd_talib_alignment() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let out = macd(&values, 2, 3, 2, TA);
        assert_series(
            &out.macd,
            &[None, None, None, Some(0.5), Some(0.5), Some(0.5)],
        );
        assert_series(
            &out.signal,
            &[None, None, None, Some(0.5), Some(0.5), Some(0.5)],
        );
        assert_abs_diff_eq!(out.hist[5].unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_macd_talib_default_lookback() {
        let values: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64).sqrt()).collect();
        let out = macd(&values, 12, 26, 9, TA);
        assert!(out.macd[32].is_none());
        assert!(out.macd[33].is_some());
        assert!(out.signal[33].is_some());
    }

    #[test]
    fn test_macd_talib_too_short() {
        let out = macd(&[1.0; 10], 12, 26, 9, TA);
        assert!(out.macd.iter().all(Option::is_none));
        assert_eq!(out.hist.len(), 10);
    }

    #[test]
    fn test_macd_rolling_is_ema_difference() {
        let values: Vec<f64> = (0..30).map(|i| 20.0 + (i as f64 * 0.3).cos()).collect();
        let out = macd(&values, 12, 26, 9, ROLL);
        let fast = ema(&values, 12, ROLL);
        let slow = ema(&values, 26, ROLL);
        for i in 0..values.len() {
            let expected = fast[i].unwrap() - slow[i].unwrap();
            assert_abs_diff_eq!(out.macd[i].unwrap(), expected, epsilon = 1e-12);
            assert_abs_diff_eq!(
                out.hist[i].unwrap(),
                out.macd[i].unwrap() - out.signal[i].unwrap(),
                epsilon = 1e-12
            );
        }
        assert_abs_diff_eq!(out.macd[0].unwrap(), 0.0);
    }

    #[test]
    fn test_rsi14_reference_values() {
        let wilder = rsi(&WAVE, 14, TA);
        assert!(wilder[13].is_none());
        assert_abs_diff_eq!(wilder[14].unwrap(), 65.82064297800338, epsilon = 1e-9);
        assert_abs_diff_eq!(wilder[39].unwrap(), 66.44729961048482, epsilon = 1e-9);

        // Same first value; the two smoothings diverge afterwards.
        let rolling = rsi(&WAVE, 14, ROLL);
        assert!(rolling[13].is_none());
        assert_abs_diff_eq!(rolling[14].unwrap(), 65.82064297800338, epsilon = 1e-9);
        assert_abs_diff_eq!(rolling[39].unwrap(), 66.07142857142857, epsilon = 1e-9);
    }

    #[test]
    fn test_macd_12_26_9_talib_reference_values() {
        let out = macd(&WAVE, 12, 26, 9, TA);
        assert!(out.macd[32].is_none());
        assert!(out.signal[32].is_none());

        assert_abs_diff_eq!(out.macd[33].unwrap(), 2.1134432612946017, epsilon = 1e-9);
        assert_abs_diff_eq!(out.signal[33].unwrap(), 2.5678081450302845, epsilon = 1e-9);
        assert_abs_diff_eq!(out.hist[33].unwrap(), -0.4543648837356828, epsilon = 1e-9);

        assert_abs_diff_eq!(out.macd[39].unwrap(), 1.8091690734373276, epsilon = 1e-9);
        assert_abs_diff_eq!(out.signal[39].unwrap(), 1.7546368106845178, epsilon = 1e-9);
        assert_abs_diff_eq!(out.hist[39].unwrap(), 0.05453226275280977, epsilon = 1e-9);
    }

    #[test]
    fn test_macd_12_26_9_rolling_reference_values() {
        let out = macd(&WAVE, 12, 26, 9, ROLL);
        assert_abs_diff_eq!(out.macd[0].unwrap(), 0.0);
        assert_abs_diff_eq!(out.signal[0].unwrap(), 0.0);

        assert_abs_diff_eq!(out.macd[1].unwrap(), 0.2153846153846154, epsilon = 1e-9);
        assert_abs_diff_eq!(out.signal[1].unwrap(), 0.043076923076923075, epsilon = 1e-9);
        assert_abs_diff_eq!(out.hist[1].unwrap(), 0.1723076923076923, epsilon = 1e-9);

        assert_abs_diff_eq!(out.macd[39].unwrap(), 1.709366393364277, epsilon = 1e-9);
        assert_abs_diff_eq!(out.signal[39].unwrap(), 1.4739476919249623, epsilon = 1e-9);
        assert_abs_diff_eq!(out.hist[39].unwrap(), 0.2354187014393147, epsilon = 1e-9);
    }
}
