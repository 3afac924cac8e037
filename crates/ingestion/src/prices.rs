//! OHLCV price loading.
//!
//! Reads a folder holding one CSV per ticker into chronologically ordered
//! [`PriceSeries`]. The ticker comes from the file stem.

use crate::dates::parse_bar_date;
use csv::{ReaderBuilder, StringRecord, Trim};
use chrono::NaiveDate;
use newscorr_core::{normalize_symbol, Error, PriceBar, PriceSeries, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const REQUIRED: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

/// Normalize a header cell: trimmed, lower-case, underscores as spaces.
fn canonical_header(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace('_', " ")
}

/// Column positions resolved from a header row.
#[derive(Debug, Clone)]
struct PriceColumns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    adj_close: Option<usize>,
    volume: usize,
}

impl PriceColumns {
    fn resolve(headers: &StringRecord, path: &Path) -> Result<Self> {
        let names: Vec<String> = headers.iter().map(canonical_header).collect();
        let find = |name: &str| names.iter().position(|h| h == name);

        let missing: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .filter(|name| find(&name.to_ascii_lowercase()).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::data(format!(
                "file {} is missing required columns: {}",
                path.display(),
                missing.join(", ")
            )));
        }

        // Presence checked above.
        let at = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            date: at("date"),
            open: at("open"),
            high: at("high"),
            low: at("low"),
            close: at("close"),
            adj_close: find("adj close"),
            volume: at("volume"),
        })
    }
}

/// Accumulates bars keyed by date; a repeated date replaces the earlier row.
struct SeriesBuilder {
    symbol: String,
    bars: BTreeMap<NaiveDate, PriceBar>,
    duplicates: usize,
}

impl SeriesBuilder {
    fn new(symbol: String) -> Self {
        Self {
            symbol,
            bars: BTreeMap::new(),
            duplicates: 0,
        }
    }

    fn add_bar(&mut self, bar: PriceBar) {
        if self.bars.insert(bar.date, bar).is_some() {
            self.duplicates += 1;
        }
    }

    fn finish(self) -> PriceSeries {
        if self.duplicates > 0 {
            warn!(
                symbol = %self.symbol,
                duplicates = self.duplicates,
                "duplicate dates in price file; kept the last row for each"
            );
        }
        PriceSeries {
            symbol: self.symbol,
            bars: self.bars.into_values().collect(),
        }
    }
}

fn parse_number(record: &StringRecord, idx: usize, column: &str, path: &Path, line: u64) -> Result<f64> {
    let raw = record.get(idx).unwrap_or("");
    raw.parse::<f64>().map_err(|_| {
        Error::data(format!(
            "{} line {line}: invalid {column} value {raw:?}",
            path.display()
        ))
    })
}

fn parse_optional(record: &StringRecord, idx: Option<usize>) -> Option<f64> {
    idx.and_then(|i| record.get(i))
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse::<f64>().ok())
}

/// Load one ticker's CSV. The symbol is the upper-cased file stem.
pub fn load_price_file(path: impl AsRef<Path>) -> Result<PriceSeries> {
    let path = path.as_ref();
    let symbol = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(normalize_symbol)
        .ok_or_else(|| Error::data(format!("cannot derive a symbol from {}", path.display())))?;

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    let columns = PriceColumns::resolve(reader.headers()?, path)?;
    let mut builder = SeriesBuilder::new(symbol);

    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let date_raw = record.get(columns.date).unwrap_or("");
        let date = parse_bar_date(date_raw).map_err(|e| {
            Error::data(format!("{} line {line}: {e}", path.display()))
        })?;

        builder.add_bar(PriceBar {
            date,
            open: parse_number(&record, columns.open, "Open", path, line)?,
            high: parse_number(&record, columns.high, "High", path, line)?,
            low: parse_number(&record, columns.low, "Low", path, line)?,
            close: parse_number(&record, columns.close, "Close", path, line)?,
            adj_close: parse_optional(&record, columns.adj_close),
            volume: parse_number(&record, columns.volume, "Volume", path, line)?,
        });
    }

    let series = builder.finish();
    debug!(symbol = %series.symbol, rows = series.len(), path = %path.display(), "loaded price file");
    Ok(series)
}

/// List the CSV files of a folder in file-name order.
fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Load every `*.csv` in `dir`, one [`PriceSeries`] per file.
pub fn load_price_dir(dir: impl AsRef<Path>) -> Result<Vec<PriceSeries>> {
    let dir = dir.as_ref();
    let files = csv_files(dir)?;
    if files.is_empty() {
        return Err(Error::data(format!("no CSV files found in {}", dir.display())));
    }

    let series = files
        .iter()
        .map(load_price_file)
        .collect::<Result<Vec<_>>>()?;

    let rows: usize = series.iter().map(PriceSeries::len).sum();
    info!(dir = %dir.display(), symbols = series.len(), rows, "loaded price data");
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const AAPL: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume,Dividends,Stock Splits
1980-12-15,0.12,0.12,0.12,0.12,0.09,175884800,0.0,0.0
1980-12-12,0.13,0.13,0.13,0.13,0.10,469033600,0.0,0.0
1980-12-16,0.11,0.11,0.11,0.11,0.08,105728000,0.0,0.0
";

    #[test]
    fn test_load_sorts_by_date() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aapl.csv");
        fs::write(&path, AAPL).unwrap();

        let series = load_price_file(&path).unwrap();
        assert_eq!(series.symbol, "AAPL");
        assert_eq!(series.len(), 3);
        assert_eq!(series.bars[0].date.to_string(), "1980-12-12");
        assert_eq!(series.bars[2].date.to_string(), "1980-12-16");
        assert_eq!(series.bars[0].adj_close, Some(0.10));
    }

    #[test]
    fn test_lowercase_and_padded_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("MSFT.csv");
        fs::write(
            &path,
            " date , open,high,low, close ,volume\n2021-03-01,1,2,0.5,1.5,100\n",
        )
        .unwrap();

        let series = load_price_file(&path).unwrap();
        assert_eq!(series.bars[0].close, 1.5);
        assert_eq!(series.bars[0].adj_close, None);
    }

    #[test]
    fn test_missing_columns_are_named() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("BAD.csv");
        fs::write(&path, "Date,Open,Close\n2021-03-01,1,2\n").unwrap();

        let err = load_price_file(&path).unwrap_err().to_string();
        assert!(err.contains("High"));
        assert!(err.contains("Low"));
        assert!(err.contains("Volume"));
        assert!(!err.contains("Open,"));
    }

    #[test]
    fn test_duplicate_dates_keep_last() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("DUP.csv");
        fs::write(
            &path,
            "Date,Open,High,Low,Close,Volume\n2021-03-01,1,1,1,1,1\n2021-03-01,2,2,2,2,2\n",
        )
        .unwrap();

        let series = load_price_file(&path).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.bars[0].close, 2.0);
    }

    #[test]
    fn test_invalid_number_reports_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("NUM.csv");
        fs::write(&path, "Date,Open,High,Low,Close,Volume\n2021-03-01,1,1,1,abc,1\n").unwrap();

        let err = load_price_file(&path).unwrap_err();
        assert!(matches!(err, Error::Data(_)));
        assert!(err.to_string().contains("Close"));
    }

    #[test]
    fn test_load_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("AAPL.csv"), AAPL).unwrap();
        fs::write(
            dir.path().join("AMZN.csv"),
            "Date,Open,High,Low,Close,Volume\n2021-03-01,1,1,1,1,1\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let all = load_price_dir(dir.path()).unwrap();
        let symbols: Vec<&str> = all.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "AMZN"]);
    }

    #[test]
    fn test_empty_dir_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_price_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("no CSV files"));
    }
}
