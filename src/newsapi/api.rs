use std::time::Duration;

use chrono::Utc;

use super::NewsApiAdapter;
use super::wire::{EverythingEnvelope, NewsApiArticle};
use crate::core::error::FetchErrorKind;
use crate::core::models::{Provider, window_start};
use crate::core::{FsError, net};
use crate::news::{RawArticle, decode_entries};
use crate::selector::is_regional_name;

const PROVIDER: Provider = Provider::DelayedGlobal;

/// Retry hint for budget errors reported in the body; the free tier resets on a daily cycle.
const BODY_RATE_LIMIT_RETRY: Duration = Duration::from_secs(3600);

pub(super) async fn fetch_everything(
    adapter: &NewsApiAdapter,
    company: &str,
    window_days: u32,
) -> Result<Vec<RawArticle>, FsError> {
    let api_key = adapter
        .api_key
        .as_deref()
        .ok_or_else(|| FsError::not_configured(PROVIDER))?;

    let from = window_start(Utc::now(), window_days)?
        .format("%Y-%m-%d")
        .to_string();

    let mut url = adapter.base.join("everything")?;
    url.query_pairs_mut()
        .append_pair("q", &search_query(company))
        .append_pair("from", &from)
        .append_pair("language", "en")
        .append_pair("sortBy", "publishedAt")
        .append_pair("pageSize", &adapter.max_articles.to_string());

    adapter.limiter.acquire().await?;

    let req = adapter
        .http
        .get(url)
        .header("X-Api-Key", api_key)
        .header("accept", "application/json");
    let resp = net::send(PROVIDER, req).await?;
    let body = net::get_text(PROVIDER, resp, "newsapi_everything", company).await?;

    parse_everything(&body, adapter.max_articles as usize)
}

/// Builds the `q` parameter: the name, its stock and shares variants, and Indian exchange
/// variants for names the free realtime tier does not cover.
pub(crate) fn search_query(company: &str) -> String {
    let name = company.replace('"', "");
    let name = name.trim();
    let mut q = format!("\"{name}\" OR \"{name} stock\" OR \"{name} shares\"");
    if is_regional_name(name) {
        q.push_str(&format!(
            " OR \"{name} India\" OR \"{name} NSE\" OR \"{name} BSE\""
        ));
    }
    q
}

pub(super) fn parse_everything(body: &str, cap: usize) -> Result<Vec<RawArticle>, FsError> {
    let env: EverythingEnvelope = serde_json::from_str(body)
        .map_err(|e| FsError::malformed(PROVIDER, format!("unexpected body: {e}")))?;

    if env.status.as_deref() == Some("error") {
        return Err(api_error(env.code.as_deref(), env.message));
    }

    let values = env
        .articles
        .ok_or_else(|| FsError::malformed(PROVIDER, "response has no articles field"))?;

    Ok(decode_entries::<NewsApiArticle>(PROVIDER, values, cap)
        .into_iter()
        .map(RawArticle::DelayedGlobal)
        .collect())
}

fn api_error(code: Option<&str>, message: Option<String>) -> FsError {
    let detail = message.unwrap_or_else(|| code.unwrap_or("unknown error").to_string());
    match code {
        Some("apiKeyInvalid" | "apiKeyMissing" | "apiKeyDisabled") => FsError::Fetch {
            provider: PROVIDER,
            kind: FetchErrorKind::Unauthorized,
            detail,
        },
        Some("rateLimited" | "apiKeyExhausted") => FsError::RateLimited {
            provider: PROVIDER,
            retry_after: BODY_RATE_LIMIT_RETRY,
        },
        _ => FsError::malformed(PROVIDER, detail),
    }
}
