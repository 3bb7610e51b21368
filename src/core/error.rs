use std::time::Duration;

use thiserror::Error;

use crate::core::models::Provider;

/// Why a provider fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The provider could not be reached (DNS, connect, timeout, body read).
    Unreachable,
    /// The provider answered with an unexpected HTTP status.
    Status(u16),
    /// The response body was not the expected envelope.
    Malformed,
    /// The provider rejected the API key.
    Unauthorized,
    /// No API key was configured for this provider.
    NotConfigured,
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable => f.write_str("provider unreachable"),
            Self::Status(code) => write!(f, "unexpected status {code}"),
            Self::Malformed => f.write_str("malformed response"),
            Self::Unauthorized => f.write_str("authentication rejected"),
            Self::NotConfigured => f.write_str("provider not configured"),
        }
    }
}

/// The taxonomy kind of an [`FsError`], for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ResolutionFailure,
    FetchError,
    RateLimited,
    ClassifierUnavailable,
    AggregationContractViolation,
    AllProvidersFailed,
    InvalidQuery,
    Config,
}

/// The primary error type for all fallible operations in this crate.
///
/// Transport errors never surface raw: the provider adapters translate them into
/// [`FsError::Fetch`] tagged with the provider that was attempted.
#[derive(Debug, Error)]
pub enum FsError {
    /// No ticker symbol could be resolved for the query text.
    #[error("no symbol found for \"{query}\" on {provider}")]
    Resolution {
        /// The text that failed to resolve.
        query: String,
        /// The provider whose symbol search was used.
        provider: Provider,
    },

    /// A provider fetch failed.
    #[error("{provider}: {kind}: {detail}")]
    Fetch {
        /// The provider that was attempted.
        provider: Provider,
        /// What went wrong.
        kind: FetchErrorKind,
        /// Human-readable detail (never a raw transport error string).
        detail: String,
    },

    /// The provider's request budget is exhausted.
    #[error("{provider}: rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// The provider whose budget was exceeded.
        provider: Provider,
        /// How long to wait before the next call is allowed.
        retry_after: Duration,
    },

    /// The sentiment classifier failed for one article.
    #[error("classifier unavailable for article {article_id}: {reason}")]
    ClassifierUnavailable {
        /// The article that could not be classified.
        article_id: String,
        /// The classifier's failure message.
        reason: String,
    },

    /// Articles and sentiment results did not correspond 1:1. Indicates a defect.
    #[error("aggregation contract violated: {0}")]
    AggregationContractViolation(String),

    /// Both the selected provider and its fallback failed.
    #[error("all providers failed (primary: {primary}; fallback: {fallback})")]
    AllProvidersFailed {
        /// The error from the first attempt.
        primary: Box<FsError>,
        /// The error from the fallback attempt.
        fallback: Box<FsError>,
    },

    /// The query was rejected before any provider was contacted.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The client could not be built from the supplied configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl FsError {
    /// The taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Resolution { .. } => ErrorKind::ResolutionFailure,
            Self::Fetch { .. } => ErrorKind::FetchError,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::ClassifierUnavailable { .. } => ErrorKind::ClassifierUnavailable,
            Self::AggregationContractViolation(_) => ErrorKind::AggregationContractViolation,
            Self::AllProvidersFailed { .. } => ErrorKind::AllProvidersFailed,
            Self::InvalidQuery(_) => ErrorKind::InvalidQuery,
            Self::Config(_) | Self::Url(_) => ErrorKind::Config,
        }
    }

    /// The provider that was attempted, when the error is tied to one.
    ///
    /// For [`FsError::AllProvidersFailed`] this is the provider of the fallback attempt.
    #[must_use]
    pub fn provider(&self) -> Option<Provider> {
        match self {
            Self::Resolution { provider, .. }
            | Self::Fetch { provider, .. }
            | Self::RateLimited { provider, .. } => Some(*provider),
            Self::AllProvidersFailed { fallback, .. } => fallback.provider(),
            _ => None,
        }
    }

    /// Whether the one-time fallback to the other provider applies to this error.
    pub(crate) const fn triggers_fallback(&self) -> bool {
        matches!(self, Self::Resolution { .. } | Self::Fetch { .. })
    }

    /// Translate a transport failure at the adapter boundary.
    pub(crate) fn transport(provider: Provider, err: &reqwest::Error) -> Self {
        let detail = if err.is_timeout() {
            "request timed out"
        } else if err.is_connect() {
            "connection failed"
        } else if err.is_decode() || err.is_body() {
            "response body could not be read"
        } else {
            "request failed"
        };
        Self::Fetch {
            provider,
            kind: FetchErrorKind::Unreachable,
            detail: detail.to_string(),
        }
    }

    pub(crate) fn not_configured(provider: Provider) -> Self {
        Self::Fetch {
            provider,
            kind: FetchErrorKind::NotConfigured,
            detail: "no API key configured".into(),
        }
    }

    pub(crate) fn malformed(provider: Provider, detail: impl Into<String>) -> Self {
        Self::Fetch {
            provider,
            kind: FetchErrorKind::Malformed,
            detail: detail.into(),
        }
    }
}
