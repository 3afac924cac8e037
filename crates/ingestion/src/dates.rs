//! Date and timestamp parsing for source CSVs.
//!
//! Price files carry exchange-local dates, sometimes with a UTC offset
//! attached (`2020-01-02 00:00:00-05:00`). News files carry publication
//! timestamps with heterogeneous offsets that must be moved into the market
//! timezone before the calendar date is taken.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use newscorr_core::{Error, Result};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

fn parse_with_offset(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).ok().or_else(|| {
        OFFSET_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    })
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn parse_date_only(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Parse the date cell of a price bar, keeping the exchange-local date.
pub fn parse_bar_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Some(dt) = parse_with_offset(raw) {
        return Ok(dt.date_naive());
    }
    if let Some(dt) = parse_naive(raw) {
        return Ok(dt.date());
    }
    parse_date_only(raw).ok_or_else(|| Error::parse(format!("unrecognized date {raw:?}")))
}

/// Parse a publication timestamp into market-local time.
///
/// Offset-carrying values are converted into `tz`; naive values and bare
/// dates are assumed to be market-local already.
pub fn parse_market_timestamp(raw: &str, tz: Tz) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Some(dt) = parse_with_offset(raw) {
        return Ok(dt.with_timezone(&tz).naive_local());
    }
    if let Some(dt) = parse_naive(raw) {
        return Ok(dt);
    }
    parse_date_only(raw)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::parse(format!("unrecognized timestamp {raw:?}")))
}
