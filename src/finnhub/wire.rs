use serde::Deserialize;

/// One `GET /company-news` entry as delivered by Finnhub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FinnhubArticle {
    #[serde(default)]
    pub category: Option<String>,
    /// Publication time, Unix seconds.
    #[serde(default)]
    pub datetime: Option<i64>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    /// Comma-separated related tickers.
    #[serde(default)]
    pub related: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Finnhub reports some failures as a `200` with an error object instead of the usual array.
#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}
