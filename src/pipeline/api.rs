use crate::aggregate::aggregate;
use crate::cache::{CacheKey, CacheMode};
use crate::core::models::{Provider, Query, Report, ResolvedSymbol};
use crate::core::{FsClient, FsError};
use crate::news::{RawArticle, normalize_batch};

use super::classify::classify_all;

/// What one provider attempt produced.
struct Fetched {
    raw: Vec<RawArticle>,
    resolved: Option<ResolvedSymbol>,
}

#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        skip(client, query),
        err,
        fields(company = %query.company_text(), window_days = query.window_days())
    )
)]
pub(super) async fn analyze(
    client: &FsClient,
    query: &Query,
    mode: CacheMode,
) -> Result<Report, FsError> {
    let selected = client.selector.select(query);
    let key = CacheKey::new(query, selected);
    client
        .cache
        .get_or_compute(&key, mode, || compute(client, query, selected))
        .await
}

async fn compute(client: &FsClient, query: &Query, selected: Provider) -> Result<Report, FsError> {
    let (provider, fetched, fallback_from) = match fetch_from(client, query, selected).await {
        Ok(f) => (selected, f, None),
        Err(primary) if primary.triggers_fallback() => {
            let other = selected.other();
            #[cfg(feature = "tracing")]
            tracing::warn!(from = %selected, to = %other, error = %primary, "falling back");
            match fetch_from(client, query, other).await {
                Ok(f) => (other, f, Some(selected)),
                Err(fallback) => {
                    return Err(FsError::AllProvidersFailed {
                        primary: Box::new(primary),
                        fallback: Box::new(fallback),
                    });
                }
            }
        }
        Err(e) => return Err(e),
    };

    let articles = normalize_batch(&fetched.raw);
    let classified = classify_all(client, articles).await;

    let mut report = aggregate(query.clone(), provider, classified.articles, classified.results)?;
    report.fallback_from = fallback_from;
    report.resolved_symbol = fetched.resolved;
    report.unclassified = classified.unclassified;
    Ok(report)
}

async fn fetch_from(
    client: &FsClient,
    query: &Query,
    provider: Provider,
) -> Result<Fetched, FsError> {
    match provider {
        Provider::DelayedGlobal => {
            let raw = client
                .delayed
                .fetch_articles(query.company_text(), query.window_days())
                .await?;
            Ok(Fetched {
                raw,
                resolved: None,
            })
        }
        Provider::RealtimeExchange => {
            let resolved = client.resolver.resolve(query.company_text()).await?;
            let Some(symbol) = resolved.ticker_symbol.as_deref() else {
                return Err(FsError::Resolution {
                    query: query.company_text().to_string(),
                    provider,
                });
            };
            let raw = client
                .realtime
                .fetch_articles(symbol, query.window_days())
                .await?;
            Ok(Fetched {
                raw,
                resolved: Some(resolved),
            })
        }
    }
}
