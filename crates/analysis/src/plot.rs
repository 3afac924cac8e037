//! SVG charts.
//!
//! - `<SYMBOL>_indicators.svg`: close with SMA/EMA above, RSI with 70/30
//!   guides below.
//! - `<SYMBOL>_sentiment_returns.svg`: daily sentiment against daily return
//!   with a least-squares line.

use crate::correlation::{linear_fit, pearson};
use chrono::{Duration, NaiveDate};
use newscorr_core::{AlignedObservation, Error, IndicatorRow, Result, SymbolIndicators};
use ordered_float::OrderedFloat;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 800;

fn plot_err<E: std::fmt::Display>(e: E) -> Error {
    Error::plot(e.to_string())
}

/// Min/max of the finite values, padded by 5% (or 1.0 when flat).
fn padded_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let finite: Vec<OrderedFloat<f64>> = values.filter(|v| v.is_finite()).map(OrderedFloat).collect();
    let min = finite.iter().min()?.0;
    let max = finite.iter().max()?.0;
    let pad = if max > min { (max - min) * 0.05 } else { 1.0 };
    Some((min - pad, max + pad))
}

fn line_points(
    rows: &[IndicatorRow],
    start: NaiveDate,
    value: impl Fn(&IndicatorRow) -> Option<f64>,
) -> Vec<(f64, f64)> {
    rows.iter()
        .filter_map(|r| value(r).map(|v| ((r.date - start).num_days() as f64, v)))
        .collect()
}

/// Price/SMA/EMA and RSI panels for one ticker.
pub fn plot_indicators(series: &SymbolIndicators, out_dir: &Path) -> Result<PathBuf> {
    let (Some(first), Some(last)) = (series.rows.first(), series.rows.last()) else {
        return Err(Error::insufficient_data(format!(
            "no rows to plot for {}",
            series.symbol
        )));
    };
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!("{}_indicators.svg", series.symbol));

    let start = first.date;
    let x_max = ((last.date - start).num_days() as f64).max(1.0);
    let date_label = |x: &f64| {
        (start + Duration::days(x.round() as i64))
            .format("%Y-%m-%d")
            .to_string()
    };

    let rows = &series.rows;
    let (y_min, y_max) = padded_range(
        rows.iter()
            .flat_map(|r| [Some(r.close), r.sma, r.ema])
            .flatten(),
    )
    .unwrap_or((0.0, 1.0));

    {
        let root = SVGBackend::new(&path, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;
        let (upper, lower) = root.split_vertically(HEIGHT * 3 / 4);

        let mut price = ChartBuilder::on(&upper)
            .caption(format!("{} Price with SMA/EMA", series.symbol), ("sans-serif", 22).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..x_max, y_min..y_max)
            .map_err(plot_err)?;
        price
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&date_label)
            .draw()
            .map_err(plot_err)?;

        price
            .draw_series(LineSeries::new(line_points(rows, start, |r| Some(r.close)), &BLACK))
            .map_err(plot_err)?
            .label("Close")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));
        price
            .draw_series(LineSeries::new(line_points(rows, start, |r| r.sma), &BLUE))
            .map_err(plot_err)?
            .label("SMA")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
        price
            .draw_series(LineSeries::new(line_points(rows, start, |r| r.ema), &RED))
            .map_err(plot_err)?
            .label("EMA")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
        price
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(plot_err)?;

        let mut rsi = ChartBuilder::on(&lower)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..x_max, 0f64..100f64)
            .map_err(plot_err)?;
        rsi.configure_mesh()
            .x_labels(8)
            .x_label_formatter(&date_label)
            .y_desc("RSI")
            .draw()
            .map_err(plot_err)?;
        rsi.draw_series(LineSeries::new(line_points(rows, start, |r| r.rsi), &MAGENTA))
            .map_err(plot_err)?;
        for (level, color) in [(70.0, RED), (30.0, GREEN)] {
            rsi.draw_series(LineSeries::new(vec![(0.0, level), (x_max, level)], &color))
                .map_err(plot_err)?;
        }

        root.present().map_err(plot_err)?;
    }

    debug!(symbol = %series.symbol, path = %path.display(), "wrote indicator chart");
    Ok(path)
}

/// File name of the pooled scatter. Per-ticker files end in
/// `_sentiment_returns.svg`, so no ticker can map onto it.
pub const POOLED_SCATTER_FILE: &str = "sentiment_returns_pooled.svg";

/// Scatter of one ticker's daily sentiment against daily return.
pub fn plot_sentiment_returns(
    symbol: &str,
    observations: &[AlignedObservation],
    out_dir: &Path,
) -> Result<PathBuf> {
    sentiment_scatter(symbol, &format!("{symbol}_sentiment_returns.svg"), observations, out_dir)
}

/// Scatter over every ticker combined.
pub fn plot_pooled_sentiment_returns(
    observations: &[AlignedObservation],
    out_dir: &Path,
) -> Result<PathBuf> {
    sentiment_scatter("All tickers", POOLED_SCATTER_FILE, observations, out_dir)
}

fn sentiment_scatter(
    label: &str,
    file_name: &str,
    observations: &[AlignedObservation],
    out_dir: &Path,
) -> Result<PathBuf> {
    if observations.is_empty() {
        return Err(Error::insufficient_data(format!(
            "no aligned observations to plot for {label}"
        )));
    }
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(file_name);

    let x: Vec<f64> = observations.iter().map(|o| o.sentiment).collect();
    let y: Vec<f64> = observations.iter().map(|o| o.daily_return).collect();
    let (y_min, y_max) = padded_range(y.iter().copied()).unwrap_or((-0.05, 0.05));

    let caption = match pearson(&x, &y) {
        Some(r) => format!("{label}: sentiment vs daily return (r = {r:.3})"),
        None => format!("{label}: sentiment vs daily return"),
    };

    {
        let root = SVGBackend::new(&path, (WIDTH, HEIGHT * 3 / 4)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 22).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-1f64..1f64, y_min..y_max)
            .map_err(plot_err)?;
        chart
            .configure_mesh()
            .x_desc("Mean daily sentiment")
            .y_desc("Daily return")
            .draw()
            .map_err(plot_err)?;

        chart
            .draw_series(
                x.iter()
                    .zip(&y)
                    .map(|(&sx, &ry)| Circle::new((sx, ry), 3, BLUE.mix(0.6).filled())),
            )
            .map_err(plot_err)?;

        if let Some((slope, intercept)) = linear_fit(&x, &y) {
            chart
                .draw_series(LineSeries::new(
                    vec![(-1.0, intercept - slope), (1.0, intercept + slope)],
                    &RED,
                ))
                .map_err(plot_err)?;
        }

        root.present().map_err(plot_err)?;
    }

    debug!(label, path = %path.display(), points = observations.len(), "wrote sentiment scatter");
    Ok(path)
}
