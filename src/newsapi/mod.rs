//! Delayed-global provider adapter (NewsAPI `everything` endpoint).

mod api;
mod wire;

pub use wire::{NewsApiArticle, NewsApiSource};

use std::sync::Arc;

use url::Url;

use crate::core::FsError;
use crate::core::models::Provider;
use crate::core::rate_limit::RateLimiter;
use crate::core::services::{BoxFuture, NewsProvider};
use crate::news::RawArticle;

/// Fetches articles matching a free-text company name from NewsAPI.
#[derive(Debug, Clone)]
pub struct NewsApiAdapter {
    http: reqwest::Client,
    base: Url,
    api_key: Option<String>,
    limiter: Arc<RateLimiter>,
    max_articles: u32,
}

impl NewsApiAdapter {
    /// Creates an adapter. `base` must end with a `/` (e.g. `https://newsapi.org/v2/`).
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

    /// The budget shared by every call through this adapter.
    #[must_use]
    pub const fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}

impl NewsProvider for NewsApiAdapter {
    fn provider(&self) -> Provider {
        Provider::DelayedGlobal
    }

    fn fetch_articles<'a>(
        &'a self,
        company_text_or_symbol: &'a str,
        window_days: u32,
    ) -> BoxFuture<'a, Result<Vec<RawArticle>, FsError>> {
        Box::pin(api::fetch_everything(
            self,
            company_text_or_symbol,
            window_days,
        ))
    }
}
