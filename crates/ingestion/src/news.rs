//! News headline loading.
//!
//! Expects a CSV with `headline`, `publisher`, `date` and `stock` columns
//! (`url` optional). Publication timestamps are normalized into the market
//! timezone so each headline lands on the trading calendar of its ticker.

use crate::dates::parse_market_timestamp;
use chrono_tz::Tz;
use csv::{ReaderBuilder, StringRecord, Trim};
use newscorr_core::{normalize_symbol, Error, NewsRecord, Result};
use std::path::Path;
use tracing::{info, warn};

/// Column positions resolved from a header row.
#[derive(Debug, Clone)]
struct NewsColumns {
    headline: usize,
    url: Option<usize>,
    publisher: usize,
    date: usize,
    stock: usize,
}

impl NewsColumns {
    fn resolve(headers: &StringRecord, path: &Path) -> Result<Self> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_ascii_lowercase()).collect();
        let find = |name: &str| names.iter().position(|h| h == name);

        let missing: Vec<&str> = ["headline", "publisher", "date", "stock"]
            .into_iter()
            .filter(|name| find(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::data(format!(
                "news file {} is missing required columns: {}",
                path.display(),
                missing.join(", ")
            )));
        }

        let at = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            headline: at("headline"),
            url: find("url"),
            publisher: at("publisher"),
            date: at("date"),
            stock: at("stock"),
        })
    }
}

/// Counters for rows that were dropped while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsLoadStats {
    /// Rows read from the file.
    pub total_rows: usize,
    /// Rows with an empty headline or ticker.
    pub empty_rows: usize,
    /// Rows whose timestamp could not be parsed.
    pub bad_timestamps: usize,
}

impl NewsLoadStats {
    /// Rows that were skipped for any reason.
    pub fn skipped(&self) -> usize {
        self.empty_rows + self.bad_timestamps
    }
}

/// Loads headline CSVs into [`NewsRecord`]s on the market calendar.
pub struct NewsLoader {
    market_tz: Tz,
    stats: NewsLoadStats,
}

impl NewsLoader {
    /// Create a loader normalizing timestamps into `market_tz`.
    pub fn new(market_tz: Tz) -> Self {
        Self {
            market_tz,
            stats: NewsLoadStats::default(),
        }
    }

    /// Statistics of the most recent load.
    pub fn stats(&self) -> &NewsLoadStats {
        &self.stats
    }

    fn parse_row(&mut self, record: &StringRecord, columns: &NewsColumns) -> Option<NewsRecord> {
        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();

        let headline = field(columns.headline);
        let stock = normalize_symbol(&field(columns.stock));
        if headline.is_empty() || stock.is_empty() {
            self.stats.empty_rows += 1;
            return None;
        }

        let published_at = match parse_market_timestamp(&field(columns.date), self.market_tz) {
            Ok(ts) => ts,
            Err(_) => {
                self.stats.bad_timestamps += 1;
                return None;
            }
        };

        Some(NewsRecord {
            headline,
            url: columns
                .url
                .and_then(|i| record.get(i))
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            publisher: field(columns.publisher),
            published_at,
            date: published_at.date(),
            stock,
        })
    }

    /// Load a news CSV. Malformed rows are skipped and counted, not fatal.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Vec<NewsRecord>> {
        let path = path.as_ref();
        self.stats = NewsLoadStats::default();

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_path(path)?;
        let columns = NewsColumns::resolve(reader.headers()?, path)?;

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            self.stats.total_rows += 1;
            if let Some(news) = self.parse_row(&record, &columns) {
                records.push(news);
            }
        }

        if self.stats.skipped() > 0 {
            warn!(
                path = %path.display(),
                empty = self.stats.empty_rows,
                bad_timestamps = self.stats.bad_timestamps,
                "skipped malformed news rows"
            );
        }
        info!(
            path = %path.display(),
            rows = records.len(),
            tz = %self.market_tz,
            "loaded news headlines"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const NEWS: &str = "\
,headline,url,publisher,date,stock
0,Stocks That Hit 52-Week Highs On Friday,https://example.com/a,Benzinga Insights,2020-06-05 10:30:54-04:00,A
1,Stocks That Hit 52-Week Highs On Wednesday,,Benzinga Insights,2020-06-03 10:45:20-04:00,a
2,,https://example.com/c,Lisa Levin,2020-05-26 04:30:07-04:00,A
3,Late night headline,https://example.com/d,Vick Meyer,2020-06-06 02:00:00+00:00,AAPL
4,Undated headline,https://example.com/e,Vick Meyer,not a date,AAPL
5,Plain date headline,https://example.com/f,Eddie Staley,2011-04-27,TSLA
";

    fn load(tz: Tz) -> (Vec<NewsRecord>, NewsLoadStats) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("news.csv");
        fs::write(&path, NEWS).unwrap();
        let mut loader = NewsLoader::new(tz);
        let records = loader.load(&path).unwrap();
        (records, loader.stats().clone())
    }

    #[test]
    fn test_load_and_skip() {
        let (records, stats) = load(chrono_tz::America::New_York);
        assert_eq!(stats.total_rows, 6);
        assert_eq!(stats.empty_rows, 1);
        assert_eq!(stats.bad_timestamps, 1);
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_symbols_normalized_and_url_optional() {
        let (records, _) = load(chrono_tz::America::New_York);
        assert_eq!(records[1].stock, "A");
        assert_eq!(records[0].url.as_deref(), Some("https://example.com/a"));
        assert!(records[1].url.is_none());
    }

    #[test]
    fn test_dates_follow_market_timezone() {
        let (records, _) = load(chrono_tz::America::New_York);
        let late = records.iter().find(|r| r.stock == "AAPL").unwrap();
        assert_eq!(late.date.to_string(), "2020-06-05");

        let (records, _) = load(chrono_tz::UTC);
        let late = records.iter().find(|r| r.stock == "AAPL").unwrap();
        assert_eq!(late.date.to_string(), "2020-06-06");
        let first = &records[0];
        assert_eq!(first.published_at.to_string(), "2020-06-05 14:30:54");
    }

    #[test]
    fn test_missing_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("news.csv");
        fs::write(&path, "headline,date\nx,2020-01-01\n").unwrap();
        let err = NewsLoader::new(chrono_tz::UTC).load(&path).unwrap_err();
        assert!(err.to_string().contains("publisher"));
        assert!(err.to_string().contains("stock"));
    }
}
