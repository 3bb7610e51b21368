use std::sync::Arc;

use finsent_rs::{FsClient, Provider, ProviderPreference};

use crate::common::KeywordClassifier;

fn live_client() -> Option<FsClient> {
    if !crate::common::live_or_record_enabled() {
        return None;
    }
    let newsapi = std::env::var("NEWSAPI_KEY").ok()?;
    let finnhub = std::env::var("FINNHUB_KEY").ok()?;
    Some(
        FsClient::builder()
            .newsapi_key(newsapi)
            .finnhub_key(finnhub)
            .classifier(Arc::new(KeywordClassifier))
            .build()
            .unwrap(),
    )
}

#[tokio::test]
#[ignore]
async fn live_analyze_smoke_and_or_record() {
    let Some(client) = live_client() else {
        return;
    };

    // With FS_RECORD=1 this writes `finnhub_search_aapl.json` and
    // `finnhub_company-news_aapl.json` under tests/fixtures.
    let report = client
        .analyze("AAPL", ProviderPreference::RealtimeExchange, 7)
        .await
        .unwrap();

    assert_eq!(report.counts.total(), report.articles.len());
    if report.fallback_from.is_none() {
        assert_eq!(report.provider_used, Provider::RealtimeExchange);
    }
}

#[tokio::test]
#[ignore]
async fn live_delayed_global_for_record() {
    let Some(client) = live_client() else {
        return;
    };

    // Records `newsapi_everything_apple.json`.
    let report = client
        .analyze("Apple", ProviderPreference::DelayedGlobal, 7)
        .await
        .unwrap();
    assert!(report.articles.len() <= 20);
}
