use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::RawArticle;
use crate::core::models::{Article, Provider};
use crate::finnhub::FinnhubArticle;
use crate::newsapi::NewsApiArticle;

/// NewsAPI replaces taken-down articles with this placeholder instead of dropping them.
const REMOVED_PLACEHOLDER: &str = "[Removed]";

/// Converts one provider record into a canonical [`Article`].
///
/// Returns `None` when the record has no title, no url, or no usable publication time.
#[must_use]
pub fn normalize(raw: &RawArticle) -> Option<Article> {
    match raw {
        RawArticle::DelayedGlobal(a) => from_newsapi(a),
        RawArticle::RealtimeExchange(a) => from_finnhub(a),
    }
}

/// Normalizes a batch in provider order, dropping unusable records and later duplicates of a url.
///
/// Ids are unique within the batch: a record reusing a native id already taken gets its content
/// id instead.
pub fn normalize_batch<'a>(raws: impl IntoIterator<Item = &'a RawArticle>) -> Vec<Article> {
    let mut urls = HashSet::new();
    let mut ids = HashSet::new();
    let mut out = Vec::new();
    for mut article in raws.into_iter().filter_map(normalize) {
        if urls.contains(&article.url) {
            continue;
        }
        if ids.contains(&article.id) {
            article.id = stable_id(&article.title, &article.url);
        }
        if !ids.insert(article.id.clone()) {
            continue;
        }
        urls.insert(article.url.clone());
        out.push(article);
    }
    out
}

/// Deterministic id for articles the provider does not identify: the first 8 bytes of
/// `sha256(title \n url)`, hex-encoded.
#[must_use]
pub fn stable_id(title: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(&hasher.finalize()[..8])
}

fn non_empty(s: Option<&String>) -> Option<&str> {
    s.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn from_newsapi(a: &NewsApiArticle) -> Option<Article> {
    let title = non_empty(a.title.as_ref()).filter(|t| *t != REMOVED_PLACEHOLDER)?;
    let url = non_empty(a.url.as_ref())?;
    let published_at = DateTime::parse_from_rfc3339(non_empty(a.published_at.as_ref())?)
        .ok()?
        .with_timezone(&Utc);

    Some(Article {
        id: stable_id(title, url),
        title: title.to_string(),
        summary: non_empty(a.description.as_ref()).map(str::to_string),
        url: url.to_string(),
        published_at,
        source_name: a
            .source
            .as_ref()
            .and_then(|s| non_empty(s.name.as_ref()))
            .unwrap_or("NewsAPI")
            .to_string(),
        provider_origin: Provider::DelayedGlobal,
    })
}

fn from_finnhub(a: &FinnhubArticle) -> Option<Article> {
    let title = non_empty(a.headline.as_ref())?;
    let url = non_empty(a.url.as_ref())?;
    let published_at = DateTime::<Utc>::from_timestamp(a.datetime?, 0)?;

    Some(Article {
        id: a
            .id
            .map_or_else(|| stable_id(title, url), |id| format!("finnhub-{id}")),
        title: title.to_string(),
        summary: non_empty(a.summary.as_ref()).map(str::to_string),
        url: url.to_string(),
        published_at,
        source_name: non_empty(a.source.as_ref())
            .unwrap_or("Finnhub")
            .to_string(),
        provider_origin: Provider::RealtimeExchange,
    })
}
