//! Provider selection policy.
//!
//! The selection is a heuristic over the query text only. It is kept behind [`SourcePolicy`]
//! so callers can swap it without touching the fetch pipeline.

use crate::core::models::{Provider, Query};

/// Exchange names that point a query at the realtime-exchange provider.
const EXCHANGE_KEYWORDS: &[&str] = &["NASDAQ", "NYSE", "NYSEARCA", "AMEX", "BATS", "OTC"];

/// Major Indian issuers. The realtime provider's free tier has no NSE/BSE coverage, so these
/// stay on the delayed-global provider even when they look like tickers (`TCS`, `SBI`).
const REGIONAL_NAMES: &[&str] = &[
    "reliance", "tcs", "infosys", "hdfc", "wipro", "icici", "bharti", "airtel", "sbi", "maruti",
    "tata",
];

/// Chooses the provider for a query.
pub trait SourcePolicy: Send + Sync {
    fn select(&self, query: &Query) -> Provider;
}

/// The default policy: explicit preference wins; otherwise ticker-shaped text or an exchange
/// keyword selects the realtime-exchange provider and everything else the delayed-global one.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSelector;

impl SourcePolicy for HeuristicSelector {
    fn select(&self, query: &Query) -> Provider {
        if let Some(explicit) = query.preferred_provider().explicit() {
            return explicit;
        }
        let text = query.company_text();
        if is_regional_name(text) {
            return Provider::DelayedGlobal;
        }
        if looks_like_ticker(text) || mentions_exchange(text) {
            Provider::RealtimeExchange
        } else {
            Provider::DelayedGlobal
        }
    }
}

/// 1–5 upper-case ASCII letters or digits, at least one of them a letter.
#[must_use]
pub fn looks_like_ticker(text: &str) -> bool {
    let text = text.trim();
    (1..=5).contains(&text.len())
        && text
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && text.chars().any(|c| c.is_ascii_uppercase())
}

/// Whether `text` names a known US exchange as a whole word.
#[must_use]
pub fn mentions_exchange(text: &str) -> bool {
    words(text).any(|w| EXCHANGE_KEYWORDS.iter().any(|k| w.eq_ignore_ascii_case(k)))
}

/// Whether `text` names one of the major Indian issuers.
#[must_use]
pub fn is_regional_name(text: &str) -> bool {
    words(text).any(|w| REGIONAL_NAMES.iter().any(|k| w.eq_ignore_ascii_case(k)))
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
}
