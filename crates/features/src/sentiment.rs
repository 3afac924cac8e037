//! Headline sentiment scoring and daily aggregation.
//!
//! Each headline gets a compound polarity in [-1, 1]; scores are then
//! averaged per (ticker, date).

use chrono::NaiveDate;
use newscorr_core::{
    config::SentimentConfig, DailySentiment, NewsRecord, ScoredHeadline, SentimentLabel, Symbol,
};
use std::collections::BTreeMap;
use tracing::info;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Something that turns text into a polarity score in [-1, 1].
pub trait SentimentScorer {
    fn score(&self, text: &str) -> f64;
}

/// VADER compound score.
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    /// Create a new scorer with the stock VADER lexicon.
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for VaderScorer {
    fn score(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let scores = self.analyzer.polarity_scores(text);
        scores
            .get("compound")
            .copied()
            .unwrap_or(0.0)
            .clamp(-1.0, 1.0)
    }
}

/// Cut-offs between negative, neutral and positive headlines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentThresholds {
    /// Scores at or above this are positive.
    pub positive: f64,
    /// Scores at or below this are negative.
    pub negative: f64,
}

impl SentimentThresholds {
    /// Bucket a score.
    pub fn label(&self, score: f64) -> SentimentLabel {
        if score >= self.positive {
            SentimentLabel::Positive
        } else if score <= self.negative {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            positive: 0.05,
            negative: -0.05,
        }
    }
}

impl From<&SentimentConfig> for SentimentThresholds {
    fn from(config: &SentimentConfig) -> Self {
        Self {
            positive: config.positive_threshold,
            negative: config.negative_threshold,
        }
    }
}

/// Score every headline.
pub fn score_headlines<S: SentimentScorer + ?Sized>(
    scorer: &S,
    thresholds: SentimentThresholds,
    records: &[NewsRecord],
) -> Vec<ScoredHeadline> {
    records
        .iter()
        .map(|r| {
            let score = scorer.score(&r.headline);
            ScoredHeadline {
                date: r.date,
                stock: r.stock.clone(),
                publisher: r.publisher.clone(),
                score,
                label: thresholds.label(score),
            }
        })
        .collect()
}

/// Accumulator for one (ticker, date).
#[derive(Debug, Clone, Default)]
struct DayAccumulator {
    sum: f64,
    count: u32,
    positive: u32,
    neutral: u32,
    negative: u32,
}

impl DayAccumulator {
    fn add(&mut self, headline: &ScoredHeadline) {
        self.sum += headline.score;
        self.count += 1;
        match headline.label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }

    fn to_daily(&self, symbol: Symbol, date: NaiveDate) -> DailySentiment {
        DailySentiment {
            date,
            symbol,
            mean_score: self.sum / f64::from(self.count.max(1)),
            headline_count: self.count,
            positive: self.positive,
            neutral: self.neutral,
            negative: self.negative,
        }
    }
}

/// Average headline scores per (ticker, date), ordered by ticker then date.
pub fn aggregate_daily(headlines: &[ScoredHeadline]) -> Vec<DailySentiment> {
    let mut days: BTreeMap<(Symbol, NaiveDate), DayAccumulator> = BTreeMap::new();
    for h in headlines {
        days.entry((h.stock.clone(), h.date)).or_default().add(h);
    }

    let daily: Vec<DailySentiment> = days
        .into_iter()
        .map(|((symbol, date), acc)| acc.to_daily(symbol, date))
        .collect();

    info!(
        headlines = headlines.len(),
        days = daily.len(),
        "aggregated daily sentiment"
    );
    daily
}
