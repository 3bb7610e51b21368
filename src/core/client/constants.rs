//! Centralized constants for default endpoints, budgets and limits.

use std::time::Duration;

use crate::core::rate_limit::RateLimit;

pub(crate) const USER_AGENT: &str = concat!("finsent-rs/", env!("CARGO_PKG_VERSION"));

/// NewsAPI v2 base (endpoint names are appended).
pub(crate) const DEFAULT_BASE_NEWSAPI: &str = "https://newsapi.org/v2/";

/// Finnhub v1 base (endpoint names are appended).
pub(crate) const DEFAULT_BASE_FINNHUB: &str = "https://finnhub.io/api/v1/";

/// NewsAPI developer tier: 100 requests per day.
pub(crate) const DEFAULT_NEWSAPI_RATE_LIMIT: RateLimit =
    RateLimit::new(100, Duration::from_secs(24 * 60 * 60)).burst(5);

/// Finnhub free tier: 60 calls per minute. A realtime query spends two (search + news).
pub(crate) const DEFAULT_FINNHUB_RATE_LIMIT: RateLimit =
    RateLimit::new(60, Duration::from_secs(60)).burst(2);

pub(crate) const DEFAULT_MAX_ARTICLES: u32 = 20;
pub(crate) const MAX_ARTICLES_LIMIT: u32 = 100;

pub(crate) const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Classifier invocations allowed to run at once.
pub(crate) const DEFAULT_CLASSIFY_CONCURRENCY: usize = 2;
