use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::core::FsError;

/// One of the two news providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provider {
    /// Broad international coverage with delayed articles (NewsAPI).
    DelayedGlobal,
    /// Exchange-listed companies with realtime news and symbol search (Finnhub).
    RealtimeExchange,
}

impl Provider {
    /// The provider used for the one-time fallback.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::DelayedGlobal => Self::RealtimeExchange,
            Self::RealtimeExchange => Self::DelayedGlobal,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DelayedGlobal => "delayed-global",
            Self::RealtimeExchange => "realtime-exchange",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller's provider choice for a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderPreference {
    /// Let the source selector decide.
    #[default]
    Auto,
    DelayedGlobal,
    RealtimeExchange,
}

impl ProviderPreference {
    /// The explicitly requested provider, or `None` for [`ProviderPreference::Auto`].
    #[must_use]
    pub const fn explicit(self) -> Option<Provider> {
        match self {
            Self::Auto => None,
            Self::DelayedGlobal => Some(Provider::DelayedGlobal),
            Self::RealtimeExchange => Some(Provider::RealtimeExchange),
        }
    }
}

impl From<Provider> for ProviderPreference {
    fn from(p: Provider) -> Self {
        match p {
            Provider::DelayedGlobal => Self::DelayedGlobal,
            Provider::RealtimeExchange => Self::RealtimeExchange,
        }
    }
}

impl FromStr for ProviderPreference {
    type Err = FsError;

    /// Accepts role names as well as the concrete provider names used by front ends.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "delayed-global" | "delayed_global" | "newsapi" => Ok(Self::DelayedGlobal),
            "realtime-exchange" | "realtime_exchange" | "finnhub" => Ok(Self::RealtimeExchange),
            other => Err(FsError::InvalidQuery(format!("unknown provider \"{other}\""))),
        }
    }
}

/// A single analysis request. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    company_text: String,
    preferred_provider: ProviderPreference,
    window_days: u32,
}

impl Query {
    /// Look-back window used when the caller has no preference.
    pub const DEFAULT_WINDOW_DAYS: u32 = 7;

    /// Builds a query, rejecting blank text and a window that is zero days or reaches past the
    /// earliest representable date.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::InvalidQuery`] if `company_text` is blank or `window_days` is 0 or
    /// out of range.
    pub fn new(
        company_text: impl Into<String>,
        preferred_provider: ProviderPreference,
        window_days: u32,
    ) -> Result<Self, FsError> {
        let company_text = company_text.into().trim().to_string();
        if company_text.is_empty() {
            return Err(FsError::InvalidQuery("company text is empty".into()));
        }
        if window_days == 0 {
            return Err(FsError::InvalidQuery("window must be at least one day".into()));
        }
        window_start(Utc::now(), window_days)?;
        Ok(Self {
            company_text,
            preferred_provider,
            window_days,
        })
    }

    #[must_use]
    pub fn company_text(&self) -> &str {
        &self.company_text
    }

    #[must_use]
    pub const fn preferred_provider(&self) -> ProviderPreference {
        self.preferred_provider
    }

    #[must_use]
    pub const fn window_days(&self) -> u32 {
        self.window_days
    }

    /// Case- and whitespace-insensitive form of the company text, used for cache keys.
    #[must_use]
    pub fn normalized_text(&self) -> String {
        self.company_text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

/// `now` minus `window_days` days.
///
/// # Errors
///
/// Returns [`FsError::InvalidQuery`] when the result falls outside the supported date range.
pub(crate) fn window_start(
    now: DateTime<Utc>,
    window_days: u32,
) -> Result<DateTime<Utc>, FsError> {
    TimeDelta::try_days(i64::from(window_days))
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            FsError::InvalidQuery(format!("window of {window_days} days is out of range"))
        })
}

/// The outcome of a symbol lookup. `ticker_symbol == None` means nothing acceptable matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSymbol {
    /// The text that was looked up.
    pub original_text: String,
    /// The accepted ticker, if any.
    pub ticker_symbol: Option<String>,
    /// The listing exchange of the accepted ticker, if known.
    pub exchange_hint: Option<String>,
}

impl ResolvedSymbol {
    pub(crate) fn unresolved(original_text: impl Into<String>) -> Self {
        Self {
            original_text: original_text.into(),
            ticker_symbol: None,
            exchange_hint: None,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.ticker_symbol.is_some()
    }
}

/// A canonical news article, independent of the provider it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Provider-native id, or a stable hash of title and url.
    pub id: String,
    /// The headline.
    pub title: String,
    /// Short description or summary, when the provider supplies one.
    pub summary: Option<String>,
    /// Link to the article. Unique within a report.
    pub url: String,
    /// Publication time.
    pub published_at: DateTime<Utc>,
    /// Name of the publishing outlet.
    pub source_name: String,
    /// Which provider delivered the article.
    pub provider_origin: Provider,
}

/// Sentiment polarity of a headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [Self; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    /// Maps a raw model label to a polarity.
    ///
    /// Three-class sentiment checkpoints often emit `LABEL_0`/`LABEL_1`/`LABEL_2` for
    /// negative/neutral/positive; named labels are matched case-insensitively.
    #[must_use]
    pub fn from_model_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "LABEL_0" | "NEGATIVE" | "NEG" => Some(Self::Negative),
            "LABEL_1" | "NEUTRAL" | "NEU" => Some(Self::Neutral),
            "LABEL_2" | "POSITIVE" | "POS" => Some(Self::Positive),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_model_label(s)
            .ok_or_else(|| FsError::InvalidQuery(format!("unknown sentiment label \"{s}\"")))
    }
}

/// What the classifier returns for one text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: SentimentLabel,
    /// In `[0, 1]`.
    pub confidence: f64,
}

/// The classification of one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub article_id: String,
    pub label: SentimentLabel,
    /// In `[0, 1]`.
    pub confidence: f64,
}

/// An article paired with its sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredArticle {
    pub article: Article,
    pub sentiment: SentimentResult,
}

/// Number of articles per sentiment label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl LabelCounts {
    #[must_use]
    pub const fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    pub(crate) const fn increment(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }
}

/// The aggregated sentiment verdict for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// The query this report answers. A report served from the cache carries the query that
    /// filled the entry, which may differ from the caller's in case, spacing or preference.
    pub query: Query,
    /// The provider whose articles were analyzed.
    pub provider_used: Provider,
    /// Set when the selected provider failed and the other one served the report.
    pub fallback_from: Option<Provider>,
    /// Symbol resolution outcome, when the realtime provider was involved.
    pub resolved_symbol: Option<ResolvedSymbol>,
    /// Classified articles, newest first.
    pub articles: Vec<ScoredArticle>,
    /// Majority label, ties broken by confidence mass.
    pub overall_label: SentimentLabel,
    /// Mean confidence of the articles carrying `overall_label`.
    pub overall_confidence: f64,
    pub counts: LabelCounts,
    /// No article could be analyzed. Distinguishes an empty result from a genuine neutral verdict.
    pub no_data: bool,
    /// Articles omitted because the classifier failed on them.
    pub unclassified: usize,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Percentage (0–100) of articles carrying `label`; 0 when there are none.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn share(&self, label: SentimentLabel) -> f64 {
        let total = self.counts.total();
        if total == 0 {
            return 0.0;
        }
        self.counts.get(label) as f64 * 100.0 / total as f64
    }

    /// The `n` most confident articles carrying `label`.
    #[must_use]
    pub fn top_headlines(&self, label: SentimentLabel, n: usize) -> Vec<&ScoredArticle> {
        let mut matching: Vec<&ScoredArticle> = self
            .articles
            .iter()
            .filter(|a| a.sentiment.label == label)
            .collect();
        matching.sort_by(|a, b| b.sentiment.confidence.total_cmp(&a.sentiment.confidence));
        matching.truncate(n);
        matching
    }
}
