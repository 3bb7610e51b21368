//! finsent-rs: news sentiment for listed companies.
//!
//! Resolves a company name, fetches recent news from NewsAPI or Finnhub, classifies every
//! headline with a caller-supplied [`SentimentClassifier`] and folds the results into a
//! [`Report`].
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use finsent_rs::{Classification, ClassifierError, FsClient, ProviderPreference,
//! #     SentimentClassifier, SentimentLabel};
//! struct AlwaysNeutral;
//! impl SentimentClassifier for AlwaysNeutral {
//!     fn classify(&self, _text: &str) -> Result<Classification, ClassifierError> {
//!         Ok(Classification { label: SentimentLabel::Neutral, confidence: 0.5 })
//!     }
//! }
//!
//! # async fn run() -> Result<(), finsent_rs::FsError> {
//! let client = FsClient::builder()
//!     .newsapi_key("...")
//!     .finnhub_key("...")
//!     .classifier(Arc::new(AlwaysNeutral))
//!     .build()?;
//!
//! let report = client.analyze("Apple", ProviderPreference::Auto, 7).await?;
//! println!("{} ({:.2})", report.overall_label, report.overall_confidence);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod cache;
pub mod core;
pub mod finnhub;
pub mod news;
pub mod newsapi;
pub mod pipeline;
pub mod search;
pub mod selector;

pub use aggregate::aggregate;
pub use cache::{CacheKey, CacheMode, ResultCache};
pub use crate::core::{
    Article, Classification, ClassifierError, ErrorKind, FetchErrorKind, FsClient,
    FsClientBuilder, FsError, LabelCounts, NewsProvider, Provider, ProviderPreference, Query,
    RateLimit, RateLimitMode, RateLimiter, RateLimiterStats, Report, ResolvedSymbol,
    ScoredArticle, SentimentClassifier, SentimentLabel, SentimentResult, SymbolResolver,
};
pub use finnhub::FinnhubNews;
pub use news::{RawArticle, normalize, normalize_batch};
pub use newsapi::NewsApiAdapter;
pub use pipeline::AnalyzeBuilder;
pub use search::{FinnhubSymbolSearch, ResolverPolicy, SymbolCandidate, pick_symbol};
pub use selector::{HeuristicSelector, SourcePolicy};
