use std::sync::Arc;

use finsent_rs::{
    FinnhubSymbolSearch, Provider, RateLimitMode, RateLimiter, ResolverPolicy, SymbolResolver,
};
use httpmock::Method::GET;
use serde_json::json;

use crate::common::{FINNHUB_KEY, finnhub_base, fixture, generous_limit};

fn search(server: &httpmock::MockServer, policy: ResolverPolicy) -> FinnhubSymbolSearch {
    FinnhubSymbolSearch::new(
        reqwest::Client::new(),
        finnhub_base(server),
        Some(FINNHUB_KEY.into()),
        Arc::new(RateLimiter::new(
            Provider::RealtimeExchange,
            generous_limit(),
            RateLimitMode::Wait,
        )),
        policy,
    )
}

#[tokio::test]
async fn offline_search_resolves_company_name() {
    let query = "Apple";
    let server = crate::common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/search")
            .query_param("q", query)
            .query_param("token", FINNHUB_KEY);
        then.status(200)
            .header("content-type", "application/json")
            .body(fixture("finnhub_search", "apple", "json"));
    });

    let resolved = search(&server, ResolverPolicy::default())
        .resolve(query)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(resolved.original_text, "Apple");
    assert_eq!(resolved.ticker_symbol.as_deref(), Some("AAPL"));
    assert_eq!(resolved.exchange_hint.as_deref(), Some("US"));
}

#[tokio::test]
async fn foreign_listing_is_not_a_match() {
    let server = crate::common::setup_server();
    let _mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/search");
        then.status(200)
            .body(fixture("finnhub_search", "reliance", "json"));
    });

    let resolved = search(&server, ResolverPolicy::default())
        .lookup("Reliance")
        .await
        .unwrap();

    assert!(!resolved.is_resolved());

    let wider = ResolverPolicy {
        allowed_exchanges: vec!["NS".into()],
        ..ResolverPolicy::default()
    };
    let resolved = search(&server, wider).lookup("Reliance").await.unwrap();
    assert_eq!(resolved.ticker_symbol.as_deref(), Some("RELIANCE.NS"));
}

#[tokio::test]
async fn strict_threshold_rejects_a_prefix_match() {
    let server = crate::common::setup_server();
    let _mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/search");
        then.status(200)
            .body(fixture("finnhub_search", "apple", "json"));
    });

    let strict = ResolverPolicy {
        min_relevance: 0.8,
        ..ResolverPolicy::default()
    };
    let resolved = search(&server, strict).lookup("Apple").await.unwrap();
    assert_eq!(resolved.ticker_symbol, None);
}

#[tokio::test]
async fn no_results_is_not_an_error() {
    let server = crate::common::setup_server();
    let _mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/search");
        then.status(200).json_body(json!({"count": 0, "result": []}));
    });

    let resolved = search(&server, ResolverPolicy::default())
        .lookup("Nonexistent Widgets")
        .await
        .unwrap();
    assert!(resolved.ticker_symbol.is_none());
    assert!(resolved.exchange_hint.is_none());
}

#[tokio::test]
async fn provider_failure_is_surfaced_not_swallowed() {
    let server = crate::common::setup_server();
    let _mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/search");
        then.status(502);
    });

    let err = search(&server, ResolverPolicy::default())
        .lookup("Apple")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), finsent_rs::ErrorKind::FetchError);
    assert_eq!(err.provider(), Some(Provider::RealtimeExchange));
}
