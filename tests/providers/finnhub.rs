use std::sync::Arc;
use std::time::Duration;

use finsent_rs::{
    FetchErrorKind, FinnhubNews, FsError, NewsProvider, Provider, RateLimit, RateLimitMode,
    RateLimiter, normalize_batch,
};
use httpmock::Method::GET;
use serde_json::json;

use crate::common::{FINNHUB_KEY, finnhub_base, fixture, generous_limit};

fn news(server: &httpmock::MockServer, limiter: Arc<RateLimiter>) -> FinnhubNews {
    FinnhubNews::new(
        reqwest::Client::new(),
        finnhub_base(server),
        Some(FINNHUB_KEY.into()),
        limiter,
        20,
    )
}

fn limiter(limit: RateLimit, mode: RateLimitMode) -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(Provider::RealtimeExchange, limit, mode))
}

#[tokio::test]
async fn offline_company_news_uses_recorded_fixture() {
    let server = crate::common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/company-news")
            .query_param("symbol", "AAPL")
            .query_param("token", FINNHUB_KEY)
            .query_param_exists("from")
            .query_param_exists("to");
        then.status(200)
            .header("content-type", "application/json")
            .body(fixture("finnhub_company-news", "aapl", "json"));
    });

    let raws = news(&server, limiter(generous_limit(), RateLimitMode::Wait))
        .fetch_articles("AAPL", 7)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(raws.len(), 5);
    assert!(raws.iter().all(|r| r.provider() == Provider::RealtimeExchange));

    let articles = normalize_batch(&raws);
    assert_eq!(articles.len(), 4);
    assert_eq!(articles[0].id, "finnhub-137612001");
    assert_eq!(articles[0].source_name, "MarketWatch");
    assert_eq!(articles[1].summary, None);
}

#[tokio::test]
async fn error_object_in_a_200_is_malformed() {
    let server = crate::common::setup_server();
    let _mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/company-news");
        then.status(200)
            .json_body(json!({"error": "You don't have access to this resource."}));
    });

    let err = news(&server, limiter(generous_limit(), RateLimitMode::Wait))
        .fetch_articles("AAPL", 7)
        .await
        .unwrap_err();

    match err {
        FsError::Fetch { kind, detail, .. } => {
            assert_eq!(kind, FetchErrorKind::Malformed);
            assert!(detail.contains("access"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn forbidden_is_an_auth_error() {
    let server = crate::common::setup_server();
    let _mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/company-news");
        then.status(403);
    });

    let err = news(&server, limiter(generous_limit(), RateLimitMode::Wait))
        .fetch_articles("AAPL", 7)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FsError::Fetch {
            provider: Provider::RealtimeExchange,
            kind: FetchErrorKind::Unauthorized,
            ..
        }
    ));
}

#[tokio::test]
async fn fail_fast_limiter_rejects_before_the_request() {
    let server = crate::common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/company-news");
        then.status(200).json_body(json!([]));
    });
    let adapter = news(
        &server,
        limiter(
            RateLimit::new(1, Duration::from_secs(60)),
            RateLimitMode::FailFast,
        ),
    );

    adapter.fetch_articles("AAPL", 7).await.unwrap();
    let err = adapter.fetch_articles("AAPL", 7).await.unwrap_err();

    mock.assert_calls(1);
    assert!(matches!(
        err,
        FsError::RateLimited {
            provider: Provider::RealtimeExchange,
            ..
        }
    ));
    assert_eq!(adapter.limiter().stats().rejected_requests, 1);
}
