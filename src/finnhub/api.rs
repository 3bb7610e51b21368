use chrono::Utc;

use super::FinnhubNews;
use super::wire::{ErrorBody, FinnhubArticle};
use crate::core::models::{Provider, window_start};
use crate::core::{FsError, net};
use crate::news::{RawArticle, decode_entries};

const PROVIDER: Provider = Provider::RealtimeExchange;

pub(super) async fn fetch_company_news(
    adapter: &FinnhubNews,
    symbol: &str,
    window_days: u32,
) -> Result<Vec<RawArticle>, FsError> {
    let token = adapter
        .api_key
        .as_deref()
        .ok_or_else(|| FsError::not_configured(PROVIDER))?;

    let to = Utc::now();
    let from = window_start(to, window_days)?;

    let mut url = adapter.base.join("company-news")?;
    url.query_pairs_mut()
        .append_pair("symbol", symbol)
        .append_pair("from", &from.format("%Y-%m-%d").to_string())
        .append_pair("to", &to.format("%Y-%m-%d").to_string())
        .append_pair("token", token);

    adapter.limiter.acquire().await?;

    let req = adapter.http.get(url).header("accept", "application/json");
    let resp = net::send(PROVIDER, req).await?;
    let body = net::get_text(PROVIDER, resp, "finnhub_company-news", symbol).await?;

    parse_company_news(&body, adapter.max_articles as usize)
}

pub(super) fn parse_company_news(body: &str, cap: usize) -> Result<Vec<RawArticle>, FsError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| FsError::malformed(PROVIDER, format!("unexpected body: {e}")))?;

    let values = match value {
        serde_json::Value::Array(values) => values,
        other => {
            let detail = serde_json::from_value::<ErrorBody>(other)
                .map_or_else(|_| "expected a list of articles".to_string(), |e| e.error);
            return Err(FsError::malformed(PROVIDER, detail));
        }
    };

    Ok(decode_entries::<FinnhubArticle>(PROVIDER, values, cap)
        .into_iter()
        .map(RawArticle::RealtimeExchange)
        .collect())
}
