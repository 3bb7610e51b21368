use thiserror::Error;

use crate::core::models::{Classification, Provider, ResolvedSymbol};
use crate::core::FsError;
use crate::news::RawArticle;

/// A boxed, sendable future, as returned by the service traits below.
pub type BoxFuture<'a, T> =
    core::pin::Pin<Box<dyn core::future::Future<Output = T> + Send + 'a>>;

/// A source of raw news articles for one provider.
///
/// Implemented by the NewsAPI and Finnhub adapters. Custom implementations can be installed
/// on the client builder, which is how tests observe upstream call counts without a network.
pub trait NewsProvider: Send + Sync {
    /// The provider role this adapter fills.
    fn provider(&self) -> Provider;

    /// Fetches at most the adapter's configured maximum of articles published within the
    /// last `window_days` days.
    ///
    /// `company_text_or_symbol` is free text for the delayed-global provider and a resolved
    /// ticker for the realtime-exchange provider.
    fn fetch_articles<'a>(
        &'a self,
        company_text_or_symbol: &'a str,
        window_days: u32,
    ) -> BoxFuture<'a, Result<Vec<RawArticle>, FsError>>;
}

/// Maps free text to a ticker symbol.
pub trait SymbolResolver: Send + Sync {
    /// Looks up `company_text`.
    ///
    /// "No acceptable match" is `Ok` with `ticker_symbol == None`; only transport and
    /// provider failures are errors.
    fn resolve<'a>(&'a self, company_text: &'a str)
    -> BoxFuture<'a, Result<ResolvedSymbol, FsError>>;
}

/// The failure message of a classifier invocation.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ClassifierError(pub String);

/// A headline sentiment classifier.
///
/// This is a synchronous, possibly slow (seconds-scale) capability. The pipeline calls it from
/// blocking worker threads with bounded parallelism, so implementations only need to be
/// thread-safe, not async.
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;
}
