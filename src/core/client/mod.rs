//! Public client surface + builder.
//! Defaults (endpoints, budgets, limits) live in `constants`.

mod constants;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use url::Url;

use crate::cache::ResultCache;
use crate::core::FsError;
use crate::core::models::Provider;
use crate::core::rate_limit::{RateLimit, RateLimitMode, RateLimiter};
use crate::core::services::{NewsProvider, SentimentClassifier, SymbolResolver};
use crate::finnhub::FinnhubNews;
use crate::newsapi::NewsApiAdapter;
use crate::search::{FinnhubSymbolSearch, ResolverPolicy};
use crate::selector::{HeuristicSelector, SourcePolicy};
use constants::{
    DEFAULT_BASE_FINNHUB, DEFAULT_BASE_NEWSAPI, DEFAULT_CACHE_TTL, DEFAULT_CLASSIFY_CONCURRENCY,
    DEFAULT_FINNHUB_RATE_LIMIT, DEFAULT_MAX_ARTICLES, DEFAULT_NEWSAPI_RATE_LIMIT,
    MAX_ARTICLES_LIMIT, USER_AGENT,
};

/// The entry point: owns the provider adapters, their budgets, the classifier pool and the
/// report cache. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct FsClient {
    pub(crate) delayed: Arc<dyn NewsProvider>,
    pub(crate) realtime: Arc<dyn NewsProvider>,
    pub(crate) resolver: Arc<dyn SymbolResolver>,
    pub(crate) selector: Arc<dyn SourcePolicy>,
    pub(crate) classifier: Arc<dyn SentimentClassifier>,
    pub(crate) classify_permits: Arc<Semaphore>,
    pub(crate) cache: Arc<ResultCache>,
    newsapi_limiter: Arc<RateLimiter>,
    finnhub_limiter: Arc<RateLimiter>,
}

impl std::fmt::Debug for FsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsClient")
            .field("cache", &self.cache)
            .field("newsapi_limiter", &self.newsapi_limiter)
            .field("finnhub_limiter", &self.finnhub_limiter)
            .finish_non_exhaustive()
    }
}

impl FsClient {
    /// Create a new builder.
    #[must_use]
    pub fn builder() -> FsClientBuilder {
        FsClientBuilder::default()
    }

    /// The report cache.
    #[must_use]
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// The request budget of the built-in adapter for `provider`.
    #[must_use]
    pub fn rate_limiter(&self, provider: Provider) -> &Arc<RateLimiter> {
        match provider {
            Provider::DelayedGlobal => &self.newsapi_limiter,
            Provider::RealtimeExchange => &self.finnhub_limiter,
        }
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct FsClientBuilder {
    user_agent: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,

    newsapi_key: Option<String>,
    finnhub_key: Option<String>,
    base_newsapi: Option<Url>,
    base_finnhub: Option<Url>,
    newsapi_rate_limit: Option<RateLimit>,
    finnhub_rate_limit: Option<RateLimit>,
    rate_limit_mode: RateLimitMode,
    max_articles: Option<u32>,
    resolver_policy: Option<ResolverPolicy>,

    cache_ttl: Option<Duration>,
    classifier: Option<Arc<dyn SentimentClassifier>>,
    classify_concurrency: Option<usize>,
    selector: Option<Arc<dyn SourcePolicy>>,

    delayed_provider: Option<Arc<dyn NewsProvider>>,
    realtime_provider: Option<Arc<dyn NewsProvider>>,
    symbol_resolver: Option<Arc<dyn SymbolResolver>>,
}

impl FsClientBuilder {
    /// Override the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set a global request timeout (overall). Default: none.
    #[must_use]
    pub const fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    #[must_use]
    pub const fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// API key for the delayed-global provider (NewsAPI). A blank key counts as unset.
    #[must_use]
    pub fn newsapi_key(mut self, key: impl Into<String>) -> Self {
        self.newsapi_key = Some(key.into());
        self
    }

    /// API key for the realtime-exchange provider (Finnhub).
    #[must_use]
    pub fn finnhub_key(mut self, key: impl Into<String>) -> Self {
        self.finnhub_key = Some(key.into());
        self
    }

    /// Override the NewsAPI base (e.g., `https://newsapi.org/v2/`).
    #[must_use]
    pub fn base_newsapi(mut self, url: Url) -> Self {
        self.base_newsapi = Some(url);
        self
    }

    /// Override the Finnhub base (e.g., `https://finnhub.io/api/v1/`).
    #[must_use]
    pub fn base_finnhub(mut self, url: Url) -> Self {
        self.base_finnhub = Some(url);
        self
    }

    /// Request budget for NewsAPI. Default: 100 per day, burst 5.
    #[must_use]
    pub const fn newsapi_rate_limit(mut self, limit: RateLimit) -> Self {
        self.newsapi_rate_limit = Some(limit);
        self
    }

    /// Request budget for Finnhub, shared by symbol search and news. Default: 60 per minute,
    /// burst 2.
    #[must_use]
    pub const fn finnhub_rate_limit(mut self, limit: RateLimit) -> Self {
        self.finnhub_rate_limit = Some(limit);
        self
    }

    /// Whether calls over budget wait or fail. Default: [`RateLimitMode::Wait`].
    #[must_use]
    pub const fn rate_limit_mode(mut self, mode: RateLimitMode) -> Self {
        self.rate_limit_mode = mode;
        self
    }

    /// Maximum articles fetched per query, clamped to `1..=100`. Default: 20.
    #[must_use]
    pub const fn max_articles(mut self, n: u32) -> Self {
        self.max_articles = Some(n);
        self
    }

    /// Acceptance rules for symbol search results.
    #[must_use]
    pub fn resolver_policy(mut self, policy: ResolverPolicy) -> Self {
        self.resolver_policy = Some(policy);
        self
    }

    /// How long a report stays cached. Default: 10 minutes.
    #[must_use]
    pub const fn cache_ttl(mut self, dur: Duration) -> Self {
        self.cache_ttl = Some(dur);
        self
    }

    /// The headline classifier. Required.
    #[must_use]
    pub fn classifier(mut self, classifier: Arc<dyn SentimentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Classifier invocations allowed at once. Default: 2.
    #[must_use]
    pub const fn classify_concurrency(mut self, n: usize) -> Self {
        self.classify_concurrency = Some(n);
        self
    }

    /// Replace the provider selection policy. Default: [`HeuristicSelector`].
    #[must_use]
    pub fn source_policy(mut self, policy: Arc<dyn SourcePolicy>) -> Self {
        self.selector = Some(policy);
        self
    }

    /// Replace the built-in NewsAPI adapter.
    #[must_use]
    pub fn delayed_provider(mut self, provider: Arc<dyn NewsProvider>) -> Self {
        self.delayed_provider = Some(provider);
        self
    }

    /// Replace the built-in Finnhub news adapter.
    #[must_use]
    pub fn realtime_provider(mut self, provider: Arc<dyn NewsProvider>) -> Self {
        self.realtime_provider = Some(provider);
        self
    }

    /// Replace the built-in Finnhub symbol search.
    #[must_use]
    pub fn symbol_resolver(mut self, resolver: Arc<dyn SymbolResolver>) -> Self {
        self.symbol_resolver = Some(resolver);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Config`] if no classifier was set, a rate limit is zero, or the
    /// classifier concurrency is zero, and [`FsError::Url`] if a default base URL fails to parse.
    pub fn build(self) -> Result<FsClient, FsError> {
        let classifier = self
            .classifier
            .ok_or_else(|| FsError::Config("a sentiment classifier is required".into()))?;

        let concurrency = self
            .classify_concurrency
            .unwrap_or(DEFAULT_CLASSIFY_CONCURRENCY);
        if concurrency == 0 {
            return Err(FsError::Config("classifier concurrency must be at least 1".into()));
        }

        let newsapi_limit = self.newsapi_rate_limit.unwrap_or(DEFAULT_NEWSAPI_RATE_LIMIT);
        let finnhub_limit = self.finnhub_rate_limit.unwrap_or(DEFAULT_FINNHUB_RATE_LIMIT);
        newsapi_limit.validate(Provider::DelayedGlobal)?;
        finnhub_limit.validate(Provider::RealtimeExchange)?;

        let base_newsapi = with_trailing_slash(match self.base_newsapi {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_NEWSAPI)?,
        });
        let base_finnhub = with_trailing_slash(match self.base_finnhub {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_FINNHUB)?,
        });

        let mut httpb = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT));
        if let Some(t) = self.timeout {
            httpb = httpb.timeout(t);
        }
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }
        let http = httpb
            .build()
            .map_err(|e| FsError::Config(format!("HTTP client could not be built: {e}")))?;

        let newsapi_key = self.newsapi_key.filter(|k| !k.trim().is_empty());
        let finnhub_key = self.finnhub_key.filter(|k| !k.trim().is_empty());

        let max_articles = self
            .max_articles
            .unwrap_or(DEFAULT_MAX_ARTICLES)
            .clamp(1, MAX_ARTICLES_LIMIT);

        let newsapi_limiter = Arc::new(RateLimiter::new(
            Provider::DelayedGlobal,
            newsapi_limit,
            self.rate_limit_mode,
        ));
        let finnhub_limiter = Arc::new(RateLimiter::new(
            Provider::RealtimeExchange,
            finnhub_limit,
            self.rate_limit_mode,
        ));

        let delayed = self.delayed_provider.unwrap_or_else(|| {
            Arc::new(NewsApiAdapter::new(
                http.clone(),
                base_newsapi,
                newsapi_key,
                newsapi_limiter.clone(),
                max_articles,
            ))
        });
        let realtime = self.realtime_provider.unwrap_or_else(|| {
            Arc::new(FinnhubNews::new(
                http.clone(),
                base_finnhub.clone(),
                finnhub_key.clone(),
                finnhub_limiter.clone(),
                max_articles,
            ))
        });
        let resolver = self.symbol_resolver.unwrap_or_else(|| {
            Arc::new(FinnhubSymbolSearch::new(
                http,
                base_finnhub,
                finnhub_key,
                finnhub_limiter.clone(),
                self.resolver_policy.unwrap_or_default(),
            ))
        });

        Ok(FsClient {
            delayed,
            realtime,
            resolver,
            selector: self.selector.unwrap_or_else(|| Arc::new(HeuristicSelector)),
            classifier,
            classify_permits: Arc::new(Semaphore::new(concurrency)),
            cache: Arc::new(ResultCache::new(self.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL))),
            newsapi_limiter,
            finnhub_limiter,
        })
    }
}

/// `Url::join` replaces the last path segment unless the base ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
