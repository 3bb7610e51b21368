//! Provider-neutral article handling: the raw per-provider records and their normalization.

mod normalize;

pub use crate::finnhub::FinnhubArticle;
pub use crate::newsapi::{NewsApiArticle, NewsApiSource};
pub use normalize::{normalize, normalize_batch, stable_id};

use serde::de::DeserializeOwned;

use crate::core::models::Provider;

/// An unnormalized article, tagged with the provider whose shape it has.
#[derive(Debug, Clone, PartialEq)]
pub enum RawArticle {
    DelayedGlobal(NewsApiArticle),
    RealtimeExchange(FinnhubArticle),
}

impl RawArticle {
    /// The provider this record came from.
    #[must_use]
    pub const fn provider(&self) -> Provider {
        match self {
            Self::DelayedGlobal(_) => Provider::DelayedGlobal,
            Self::RealtimeExchange(_) => Provider::RealtimeExchange,
        }
    }
}

/// Decodes provider entries one at a time, skipping the ones that do not fit `T`, and keeps at
/// most `cap` of them.
pub(crate) fn decode_entries<T: DeserializeOwned>(
    provider: Provider,
    values: Vec<serde_json::Value>,
    cap: usize,
) -> Vec<T> {
    let mut out = Vec::with_capacity(values.len().min(cap));
    let mut skipped = 0usize;
    for value in values {
        if out.len() == cap {
            break;
        }
        match serde_json::from_value::<T>(value) {
            Ok(entry) => out.push(entry),
            Err(_) => skipped += 1,
        }
    }
    #[cfg(feature = "tracing")]
    if skipped > 0 {
        tracing::warn!(%provider, skipped, "skipped malformed provider entries");
    }
    #[cfg(not(feature = "tracing"))]
    let _ = (provider, skipped);
    out
}
