//! Rolling-window statistics.
//!
//! Running sums over a fixed window of the most recent observations.

use std::collections::VecDeque;

/// Rolling arithmetic mean over the last `window` values.
pub struct RollingMean {
    /// Window size in periods.
    window: usize,
    /// Values currently in the window.
    values: VecDeque<f64>,
    /// Running sum of the window.
    sum: f64,
}

impl RollingMean {
    /// Create a new rolling mean.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            values: VecDeque::with_capacity(window),
            sum: 0.0,
        }
    }

    /// Push a value, evicting the oldest once the window is full.
    ///
    /// Returns the mean once the window is full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.values.len() >= self.window {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }
        self.values.push_back(value);
        self.sum += value;

        if self.is_ready() {
            self.mean()
        } else {
            None
        }
    }

    /// Mean of whatever the window currently holds (expanding during warm-up).
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.sum / self.values.len() as f64)
        }
    }

    /// Check if the window is full. A zero-length window never is.
    pub fn is_ready(&self) -> bool {
        self.window > 0 && self.values.len() >= self.window
    }
}

/// Rolling volatility of simple returns, sample standard deviation (ddof = 1).
pub struct RollingVolatility {
    /// Window size in returns.
    window: usize,
    /// Multiplier applied to the raw standard deviation (sqrt of periods per year).
    annualization: f64,
    /// Recent returns.
    returns: VecDeque<f64>,
    /// Previous price (for computing next return).
    prev_price: Option<f64>,
    /// Running sum of returns.
    sum: f64,
    /// Running sum of squared returns.
    sum_sq: f64,
}

impl RollingVolatility {
    /// Create a calculator annualized over `periods_per_year` (1 = raw daily).
    pub fn new(window: usize, periods_per_year: u32) -> Self {
        Self {
            window,
            annualization: f64::from(periods_per_year).sqrt(),
            returns: VecDeque::with_capacity(window),
            prev_price: None,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    /// Add a price observation.
    ///
    /// Returns the current volatility once the window is full.
    pub fn add_price(&mut self, price: f64) -> Option<f64> {
        if let Some(prev) = self.prev_price {
            if prev != 0.0 && prev.is_finite() && price.is_finite() {
                self.add_return(price / prev - 1.0);
            }
        }
        self.prev_price = Some(price);
        if self.is_ready() {
            self.volatility()
        } else {
            None
        }
    }

    fn add_return(&mut self, ret: f64) {
        if self.returns.len() >= self.window {
            if let Some(old) = self.returns.pop_front() {
                self.sum -= old;
                self.sum_sq -= old * old;
            }
        }

        self.returns.push_back(ret);
        self.sum += ret;
        self.sum_sq += ret * ret;
    }

    /// Current annualized volatility (needs at least two returns).
    pub fn volatility(&self) -> Option<f64> {
        let n = self.returns.len();
        if n < 2 {
            return None;
        }

        let n_f = n as f64;
        let variance = (self.sum_sq - self.sum * self.sum / n_f) / (n_f - 1.0);

        // Running sums can drift slightly below zero on flat series.
        let std = if variance <= 0.0 { 0.0 } else { variance.sqrt() };
        Some(std * self.annualization)
    }

    /// Check if the window is full.
    pub fn is_ready(&self) -> bool {
        self.returns.len() >= self.window
    }
}
