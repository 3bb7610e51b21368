use finsent_rs::{
    ErrorKind, FetchErrorKind, FsError, Provider, ProviderPreference, RateLimitMode,
};
use httpmock::Method::GET;
use serde_json::json;

use crate::common::{
    FINNHUB_KEY, builder, client, mock_finnhub_search, mock_newsapi_everything,
};

#[tokio::test]
async fn realtime_fetch_error_falls_back_to_delayed_global() {
    let server = crate::common::setup_server();
    let search = mock_finnhub_search(&server, "AAPL", "aapl");
    let news = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/company-news")
            .query_param("symbol", "AAPL");
        then.status(500).body("internal error");
    });
    let everything = mock_newsapi_everything(&server, "apple");
    let client = client(&server);

    let report = client
        .analyze("AAPL", ProviderPreference::Auto, 7)
        .await
        .unwrap();

    search.assert();
    news.assert();
    everything.assert();
    assert_eq!(report.provider_used, Provider::DelayedGlobal);
    assert_eq!(report.fallback_from, Some(Provider::RealtimeExchange));
    assert!(!report.articles.is_empty());
    assert!(
        report
            .articles
            .iter()
            .all(|s| s.article.provider_origin == Provider::DelayedGlobal)
    );
}

#[tokio::test]
async fn unresolved_symbol_falls_back_to_delayed_global() {
    let server = crate::common::setup_server();
    let search = mock_finnhub_search(&server, "Reliance", "reliance");
    let news = server.mock(|when, then| {
        when.method(GET).path("/api/v1/company-news");
        then.status(200).json_body(json!([]));
    });
    let everything = mock_newsapi_everything(&server, "apple");
    let client = client(&server);

    let report = client
        .analyze("Reliance", ProviderPreference::RealtimeExchange, 7)
        .await
        .unwrap();

    search.assert();
    news.assert_calls(0);
    everything.assert();
    assert_eq!(report.provider_used, Provider::DelayedGlobal);
    assert_eq!(report.fallback_from, Some(Provider::RealtimeExchange));
    assert!(report.resolved_symbol.is_none());
}

#[tokio::test]
async fn missing_key_falls_back_without_calling_the_provider() {
    let server = crate::common::setup_server();
    let search = server.mock(|when, then| {
        when.method(GET).path("/api/v1/search");
        then.status(200).json_body(json!({"count": 0, "result": []}));
    });
    let everything = mock_newsapi_everything(&server, "apple");
    let client_without_key = finsent_rs::FsClient::builder()
        .base_newsapi(crate::common::newsapi_base(&server))
        .base_finnhub(crate::common::finnhub_base(&server))
        .newsapi_key(crate::common::NEWSAPI_KEY)
        .finnhub_key("  ")
        .newsapi_rate_limit(crate::common::generous_limit())
        .classifier(std::sync::Arc::new(crate::common::KeywordClassifier))
        .build()
        .unwrap();

    let report = client_without_key
        .analyze("MSFT", ProviderPreference::Auto, 7)
        .await
        .unwrap();

    search.assert_calls(0);
    everything.assert();
    assert_eq!(report.fallback_from, Some(Provider::RealtimeExchange));
}

#[tokio::test]
async fn both_providers_failing_reports_both_errors() {
    let server = crate::common::setup_server();
    let _search = mock_finnhub_search(&server, "AAPL", "aapl");
    let _news = server.mock(|when, then| {
        when.method(GET).path("/api/v1/company-news");
        then.status(503);
    });
    let everything = server.mock(|when, then| {
        when.method(GET).path("/v2/everything");
        then.status(401).json_body(json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid or incorrect."
        }));
    });
    let client = client(&server);

    let err = client
        .analyze("AAPL", ProviderPreference::Auto, 7)
        .await
        .unwrap_err();

    everything.assert();
    assert_eq!(err.kind(), ErrorKind::AllProvidersFailed);
    assert_eq!(err.provider(), Some(Provider::DelayedGlobal));
    match err {
        FsError::AllProvidersFailed { primary, fallback } => {
            assert!(matches!(
                *primary,
                FsError::Fetch {
                    provider: Provider::RealtimeExchange,
                    kind: FetchErrorKind::Status(503),
                    ..
                }
            ));
            assert!(matches!(
                *fallback,
                FsError::Fetch {
                    provider: Provider::DelayedGlobal,
                    kind: FetchErrorKind::Unauthorized,
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(client.cache().is_empty().await);
}

#[tokio::test]
async fn provider_rate_limit_is_surfaced_without_fallback() {
    let server = crate::common::setup_server();
    let _search = mock_finnhub_search(&server, "AAPL", "aapl");
    let news = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/company-news")
            .query_param("token", FINNHUB_KEY);
        then.status(429).header("retry-after", "30");
    });
    let everything = mock_newsapi_everything(&server, "apple");
    let client = builder(&server)
        .rate_limit_mode(RateLimitMode::Wait)
        .build()
        .unwrap();

    let err = client
        .analyze("AAPL", ProviderPreference::Auto, 7)
        .await
        .unwrap_err();

    news.assert();
    everything.assert_calls(0);
    match err {
        FsError::RateLimited {
            provider,
            retry_after,
        } => {
            assert_eq!(provider, Provider::RealtimeExchange);
            assert_eq!(retry_after.as_secs(), 30);
        }
        other => panic!("unexpected error: {other}"),
    }
}
