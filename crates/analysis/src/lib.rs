//! Analysis layer for the newscorr pipeline.
//!
//! This crate provides:
//! - Per-ticker financial metrics (annualized return/volatility, Sharpe, drawdown)
//! - Date alignment of daily sentiment with daily returns
//! - Pearson/Spearman correlation with p-values
//! - SVG charts and CSV/JSON reports
//! - The end-to-end [`Pipeline`]

pub mod alignment;
pub mod correlation;
pub mod metrics;
pub mod pipeline;
pub mod plot;
pub mod report;

pub use alignment::{align, Alignment};
pub use correlation::{correlate, pearson, spearman, CorrelationResult, POOLED};
pub use metrics::{FinancialMetrics, MetricsCalculator};
pub use pipeline::{IndicatorReport, Pipeline, PipelineOutput};
pub use plot::POOLED_SCATTER_FILE;
pub use report::{ReportWriter, RunSummary};
