//! The `analyze` entry point: select, fetch (with one fallback), normalize, classify, aggregate.

mod api;
mod classify;

use crate::cache::{CacheKey, CacheMode};
use crate::core::models::{ProviderPreference, Query, Report};
use crate::core::{FsClient, FsError};

impl FsClient {
    /// Analyzes recent news sentiment for `company_text`.
    ///
    /// Results are cached per (company, selected provider, window) for the cache TTL, and
    /// concurrent identical calls share one upstream fetch. A cached report keeps the
    /// [`Query`] that produced it.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::InvalidQuery`] for blank text or a zero window,
    /// [`FsError::RateLimited`] when a provider budget is exhausted, and
    /// [`FsError::AllProvidersFailed`] when the selected provider and its fallback both fail.
    pub async fn analyze(
        &self,
        company_text: &str,
        preference: ProviderPreference,
        window_days: u32,
    ) -> Result<Report, FsError> {
        let query = Query::new(company_text, preference, window_days)?;
        self.analyze_query(&query).await
    }

    /// Like [`FsClient::analyze`], for an already validated [`Query`].
    ///
    /// # Errors
    ///
    /// See [`FsClient::analyze`].
    pub async fn analyze_query(&self, query: &Query) -> Result<Report, FsError> {
        api::analyze(self, query, CacheMode::Use).await
    }

    /// Starts a per-call builder, e.g. to bypass the cache.
    pub fn analyze_builder(&self, company_text: impl Into<String>) -> AnalyzeBuilder {
        AnalyzeBuilder::new(self, company_text)
    }

    /// The cache key `query` would be stored under.
    #[must_use]
    pub fn cache_key(&self, query: &Query) -> CacheKey {
        CacheKey::new(query, self.selector.select(query))
    }
}

/// A builder for one sentiment analysis.
pub struct AnalyzeBuilder {
    client: FsClient,
    company_text: String,
    preference: ProviderPreference,
    window_days: u32,
    cache_mode: CacheMode,
}

impl AnalyzeBuilder {
    /// Creates a new `AnalyzeBuilder` for `company_text` with the default window.
    pub fn new(client: &FsClient, company_text: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            company_text: company_text.into(),
            preference: ProviderPreference::Auto,
            window_days: Query::DEFAULT_WINDOW_DAYS,
            cache_mode: CacheMode::Use,
        }
    }

    /// Pins the provider instead of letting the selector decide.
    #[must_use]
    pub const fn provider(mut self, preference: ProviderPreference) -> Self {
        self.preference = preference;
        self
    }

    /// Sets the look-back window in days.
    #[must_use]
    pub const fn window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    /// Sets the cache mode for this call.
    #[must_use]
    pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Runs the analysis.
    ///
    /// # Errors
    ///
    /// See [`FsClient::analyze`].
    pub async fn fetch(self) -> Result<Report, FsError> {
        let query = Query::new(self.company_text, self.preference, self.window_days)?;
        api::analyze(&self.client, &query, self.cache_mode).await
    }
}
