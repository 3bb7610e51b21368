//! Core components of the `finsent-rs` client.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The main [`FsClient`] and its builder.
//! - The primary [`FsError`] type.
//! - Shared data models like [`Query`], [`Article`] and [`Report`].
//! - Per-provider request budgets and internal networking.

/// The main client (`FsClient`), builder, and configuration.
pub mod client;
/// The primary error type (`FsError`) for the crate.
pub mod error;
/// Shared data models used across the pipeline (e.g., `Query`, `Article`, `Report`).
pub mod models;
/// Per-provider request budgets.
pub mod rate_limit;
/// Service traits for the pluggable seams: providers, symbol resolution, classification.
pub mod services;

#[cfg(feature = "test-mode")]
pub(crate) mod fixtures;

pub(crate) mod net;

// convenient re-exports so most code can just `use crate::core::FsClient`
pub use client::{FsClient, FsClientBuilder};
pub use error::{ErrorKind, FetchErrorKind, FsError};
pub use models::{
    Article, Classification, LabelCounts, Provider, ProviderPreference, Query, Report,
    ResolvedSymbol, ScoredArticle, SentimentLabel, SentimentResult,
};
pub use rate_limit::{RateLimit, RateLimitMode, RateLimiter, RateLimiterStats};
pub use services::{ClassifierError, NewsProvider, SentimentClassifier, SymbolResolver};
