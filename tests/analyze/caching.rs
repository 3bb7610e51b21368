use std::time::Duration;

use finsent_rs::{CacheMode, ProviderPreference};
use httpmock::Method::GET;

use crate::common::{NEWSAPI_KEY, builder, client, fixture, mock_newsapi_everything};

#[tokio::test]
async fn identical_queries_within_ttl_hit_upstream_once() {
    let server = crate::common::setup_server();
    let everything = mock_newsapi_everything(&server, "apple");
    let client = client(&server);

    let first = client
        .analyze("Apple", ProviderPreference::Auto, 7)
        .await
        .unwrap();
    // same key after case and whitespace normalization
    let second = client
        .analyze("  apple ", ProviderPreference::Auto, 7)
        .await
        .unwrap();

    everything.assert_calls(1);
    assert_eq!(first, second);
    assert_eq!(client.cache().len().await, 1);
}

#[tokio::test]
async fn window_and_provider_are_part_of_the_key() {
    let server = crate::common::setup_server();
    let everything = mock_newsapi_everything(&server, "apple");
    let client = client(&server);

    client
        .analyze("Apple", ProviderPreference::Auto, 7)
        .await
        .unwrap();
    client
        .analyze("Apple", ProviderPreference::Auto, 3)
        .await
        .unwrap();
    let shared = client
        .analyze("Apple", ProviderPreference::DelayedGlobal, 7)
        .await
        .unwrap();

    // Auto and an explicit DelayedGlobal select the same provider, so they share an entry
    everything.assert_calls(2);
    // and the report keeps the query that filled it
    assert_eq!(shared.query.preferred_provider(), ProviderPreference::Auto);
}

#[tokio::test]
async fn refresh_and_bypass_go_upstream() {
    let server = crate::common::setup_server();
    let everything = mock_newsapi_everything(&server, "apple");
    let client = client(&server);

    client
        .analyze_builder("Apple")
        .cache_mode(CacheMode::Bypass)
        .fetch()
        .await
        .unwrap();
    assert!(client.cache().is_empty().await);

    client.analyze_builder("Apple").fetch().await.unwrap();
    client
        .analyze_builder("Apple")
        .cache_mode(CacheMode::Refresh)
        .fetch()
        .await
        .unwrap();
    client.analyze_builder("Apple").fetch().await.unwrap();

    everything.assert_calls(3);
}

#[tokio::test]
async fn invalidated_key_is_recomputed() {
    let server = crate::common::setup_server();
    let everything = mock_newsapi_everything(&server, "apple");
    let client = client(&server);

    let q = finsent_rs::Query::new("Apple", ProviderPreference::Auto, 7).unwrap();
    client.analyze_query(&q).await.unwrap();
    let key = client.cache_key(&q);
    assert!(client.cache().get(&key).await.is_some());

    client.cache().invalidate(&key).await;
    client.analyze_query(&q).await.unwrap();
    everything.assert_calls(2);
}

#[tokio::test]
async fn short_ttl_expires_entries() {
    let server = crate::common::setup_server();
    let everything = mock_newsapi_everything(&server, "apple");
    let client = builder(&server)
        .cache_ttl(Duration::from_millis(50))
        .build()
        .unwrap();

    client
        .analyze("Apple", ProviderPreference::Auto, 7)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    client
        .analyze("Apple", ProviderPreference::Auto, 7)
        .await
        .unwrap();

    everything.assert_calls(2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_queries_share_one_fetch() {
    let server = crate::common::setup_server();
    let body = fixture("newsapi_everything", "apple", "json");
    let everything = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/everything")
            .header("x-api-key", NEWSAPI_KEY);
        then.status(200)
            .header("content-type", "application/json")
            .delay(Duration::from_millis(300))
            .body(body);
    });
    let client = client(&server);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .analyze("Apple", ProviderPreference::Auto, 7)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut reports = Vec::new();
    for h in handles {
        reports.push(h.await.unwrap());
    }

    everything.assert_calls(1);
    assert_eq!(reports.len(), 8);
    assert!(reports.windows(2).all(|w| w[0] == w[1]));
}
