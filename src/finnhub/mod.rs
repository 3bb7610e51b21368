//! Realtime-exchange provider adapter (Finnhub `company-news` endpoint).
//!
//! Finnhub news is keyed by ticker, so this adapter expects a symbol produced by the
//! [`crate::search`] resolver. Both share one [`RateLimiter`] because Finnhub budgets per key.

mod api;
mod wire;

pub use wire::FinnhubArticle;

use std::sync::Arc;

use url::Url;

use crate::core::FsError;
use crate::core::models::Provider;
use crate::core::rate_limit::RateLimiter;
use crate::core::services::{BoxFuture, NewsProvider};
use crate::news::RawArticle;

/// Fetches company news for a ticker symbol from Finnhub.
#[derive(Debug, Clone)]
pub struct FinnhubNews {
    http: reqwest::Client,
    base: Url,
    api_key: Option<String>,
    limiter: Arc<RateLimiter>,
    max_articles: u32,
}

impl FinnhubNews {
    /// Creates an adapter. `base` must end with a `/` (e.g. `https://finnhub.io/api/v1/`).
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base: Url,
        api_key: Option<String>,
        limiter: Arc<RateLimiter>,
        max_articles: u32,
    ) -> Self {
        Self {
            http,
            base,
            api_key,
            limiter,
            max_articles,
        }
    }

    #[must_use]
    pub const fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}

impl NewsProvider for FinnhubNews {
    fn provider(&self) -> Provider {
        Provider::RealtimeExchange
    }

    fn fetch_articles<'a>(
        &'a self,
        company_text_or_symbol: &'a str,
        window_days: u32,
    ) -> BoxFuture<'a, Result<Vec<RawArticle>, FsError>> {
        Box::pin(api::fetch_company_news(
            self,
            company_text_or_symbol,
            window_days,
        ))
    }
}
