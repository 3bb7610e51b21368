//! Symbol resolution against Finnhub's `GET /search` endpoint.

use std::sync::Arc;

use serde::Deserialize;
use url::Url;

use crate::core::models::{Provider, ResolvedSymbol};
use crate::core::rate_limit::RateLimiter;
use crate::core::services::{BoxFuture, SymbolResolver};
use crate::core::{FsError, net};

const PROVIDER: Provider = Provider::RealtimeExchange;

/// Which search results are trusted enough to fetch realtime news for.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverPolicy {
    /// Minimum relevance in `[0, 1]` the top-ranked candidate must reach.
    pub min_relevance: f64,
    /// Listing exchanges (upper-case) the candidate must trade on.
    pub allowed_exchanges: Vec<String>,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            min_relevance: 0.5,
            allowed_exchanges: ["US", "NASDAQ", "NYSE", "AMEX", "XNAS", "XNYS"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// One search result, reduced to what resolution needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolCandidate {
    pub symbol: String,
    pub description: String,
    pub kind: String,
    /// Relevance reported by the provider, when it reports one.
    pub score: Option<f64>,
    /// Listing exchange reported by the provider, when it reports one.
    pub exchange: Option<String>,
}

impl SymbolCandidate {
    /// The reported exchange, or one inferred from the symbol: `AAPL` trades in the US,
    /// `RELIANCE.NS` on the venue named by its suffix.
    #[must_use]
    pub fn listing_exchange(&self) -> String {
        if let Some(ex) = self.exchange.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return ex.to_ascii_uppercase();
        }
        self.symbol
            .rsplit_once('.')
            .map_or_else(|| "US".to_string(), |(_, suffix)| suffix.to_ascii_uppercase())
    }

    /// Reported relevance, or a lexical score against the query text.
    #[must_use]
    pub fn relevance(&self, query: &str) -> f64 {
        if let Some(score) = self.score {
            return score.clamp(0.0, 1.0);
        }
        let q = query.trim().to_lowercase();
        let desc = self.description.trim().to_lowercase();
        if q.is_empty() {
            0.0
        } else if self.symbol.eq_ignore_ascii_case(&q) {
            1.0
        } else if desc == q {
            0.9
        } else if desc.starts_with(&q) {
            0.75
        } else if desc.contains(&q) {
            0.6
        } else {
            0.0
        }
    }
}

/// Applies `policy` to ranked `candidates`: only the top-ranked common stock is considered.
#[must_use]
pub fn pick_symbol(
    query: &str,
    candidates: &[SymbolCandidate],
    policy: &ResolverPolicy,
) -> ResolvedSymbol {
    let Some(top) = candidates
        .iter()
        .find(|c| c.kind.eq_ignore_ascii_case("Common Stock") && !c.symbol.is_empty())
    else {
        return ResolvedSymbol::unresolved(query);
    };

    let exchange = top.listing_exchange();
    let allowed = policy
        .allowed_exchanges
        .iter()
        .any(|e| e.eq_ignore_ascii_case(&exchange));
    if !allowed || top.relevance(query) < policy.min_relevance {
        return ResolvedSymbol::unresolved(query);
    }

    ResolvedSymbol {
        original_text: query.to_string(),
        ticker_symbol: Some(top.symbol.clone()),
        exchange_hint: Some(exchange),
    }
}

/// Resolves company names to tickers with Finnhub symbol search.
#[derive(Debug, Clone)]
pub struct FinnhubSymbolSearch {
    http: reqwest::Client,
    base: Url,
    api_key: Option<String>,
    limiter: Arc<RateLimiter>,
    policy: ResolverPolicy,
}

impl FinnhubSymbolSearch {
    /// Creates a resolver. Pass the same `limiter` as the Finnhub news adapter.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base: Url,
        api_key: Option<String>,
        limiter: Arc<RateLimiter>,
        policy: ResolverPolicy,
    ) -> Self {
        Self {
            http,
            base,
            api_key,
            limiter,
            policy,
        }
    }

    /// Runs the search and applies the resolver policy.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Fetch`] or [`FsError::RateLimited`] for provider failures. An empty or
    /// unacceptable result is not an error.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub async fn lookup(&self, company_text: &str) -> Result<ResolvedSymbol, FsError> {
        let token = self
            .api_key
            .as_deref()
            .ok_or_else(|| FsError::not_configured(PROVIDER))?;

        let mut url = self.base.join("search")?;
        url.query_pairs_mut()
            .append_pair("q", company_text)
            .append_pair("token", token);

        self.limiter.acquire().await?;

        let req = self.http.get(url).header("accept", "application/json");
        let resp = net::send(PROVIDER, req).await?;
        let body = net::get_text(PROVIDER, resp, "finnhub_search", company_text).await?;

        let candidates = parse_search_body(&body)?;
        Ok(pick_symbol(company_text, &candidates, &self.policy))
    }
}

impl SymbolResolver for FinnhubSymbolSearch {
    fn resolve<'a>(
        &'a self,
        company_text: &'a str,
    ) -> BoxFuture<'a, Result<ResolvedSymbol, FsError>> {
        Box::pin(self.lookup(company_text))
    }
}

fn parse_search_body(body: &str) -> Result<Vec<SymbolCandidate>, FsError> {
    let env: SearchEnvelope = serde_json::from_str(body)
        .map_err(|e| FsError::malformed(PROVIDER, format!("unexpected search body: {e}")))?;

    Ok(env
        .result
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| serde_json::from_value::<SearchResult>(v).ok())
        .map(|r| SymbolCandidate {
            symbol: r.symbol.unwrap_or_default(),
            description: r.description.unwrap_or_default(),
            kind: r.kind.unwrap_or_default(),
            score: r.score,
            exchange: r.exchange.or(r.mic),
        })
        .collect())
}

/* ------------- Minimal serde mapping of /search ------------- */

#[derive(Deserialize)]
struct SearchEnvelope {
    #[allow(dead_code)]
    count: Option<i64>,
    result: Option<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
struct SearchResult {
    #[serde(default)]
    description: Option<String>,
    #[allow(dead_code)]
    #[serde(rename = "displaySymbol")]
    #[serde(default)]
    display_symbol: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(rename = "type")]
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(default)]
    mic: Option<String>,
}
