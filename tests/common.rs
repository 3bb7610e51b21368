#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use std::{fs, path::Path};

use finsent_rs::{
    Classification, ClassifierError, FsClient, FsClientBuilder, RateLimit, SentimentClassifier,
    SentimentLabel,
};
use httpmock::{Method::GET, Mock, MockServer};
use url::Url;

pub const NEWSAPI_KEY: &str = "newsapi-test-key";
pub const FINNHUB_KEY: &str = "finnhub-test-key";

pub fn setup_server() -> MockServer {
    MockServer::start()
}

pub fn fixture(endpoint: &str, key: &str, ext: &str) -> String {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let filename = format!("{}_{}.{}", endpoint, key, ext);
    let path = dir.join(&filename);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e))
}

pub fn live_or_record_enabled() -> bool {
    std::env::var("FS_LIVE").ok().as_deref() == Some("1")
        || std::env::var("FS_RECORD").ok().as_deref() == Some("1")
}

pub fn newsapi_base(server: &MockServer) -> Url {
    Url::parse(&format!("{}/v2/", server.base_url())).unwrap()
}

pub fn finnhub_base(server: &MockServer) -> Url {
    Url::parse(&format!("{}/api/v1/", server.base_url())).unwrap()
}

/// A budget that never gets in the way of a test.
pub fn generous_limit() -> RateLimit {
    RateLimit::new(1_000, Duration::from_secs(1)).burst(100)
}

/// Labels headlines by keyword: positive 0.9, negative 0.8, neutral 0.6.
pub struct KeywordClassifier;

impl SentimentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let t = text.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| t.contains(w));
        let c = if has(&["surge", "beat", "record", "rise", "gain"]) {
            Classification {
                label: SentimentLabel::Positive,
                confidence: 0.9,
            }
        } else if has(&["lawsuit", "cut", "drop", "fall", "miss", "weak"]) {
            Classification {
                label: SentimentLabel::Negative,
                confidence: 0.8,
            }
        } else {
            Classification {
                label: SentimentLabel::Neutral,
                confidence: 0.6,
            }
        };
        Ok(c)
    }
}

/// Fails on headlines containing `needle`, otherwise behaves like [`KeywordClassifier`].
pub struct FailingOn(pub &'static str);

impl SentimentClassifier for FailingOn {
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        if text.to_lowercase().contains(self.0) {
            return Err(ClassifierError("model not loaded".into()));
        }
        KeywordClassifier.classify(text)
    }
}

/// Builder pointed at `server` for both providers, with keys and generous budgets.
pub fn builder(server: &MockServer) -> FsClientBuilder {
    FsClient::builder()
        .base_newsapi(newsapi_base(server))
        .base_finnhub(finnhub_base(server))
        .newsapi_key(NEWSAPI_KEY)
        .finnhub_key(FINNHUB_KEY)
        .newsapi_rate_limit(generous_limit())
        .finnhub_rate_limit(generous_limit())
        .classifier(Arc::new(KeywordClassifier))
}

pub fn client(server: &MockServer) -> FsClient {
    builder(server).build().unwrap()
}

pub fn mock_newsapi_everything<'a>(server: &'a MockServer, key: &str) -> Mock<'a> {
    let body = fixture("newsapi_everything", key, "json");
    server.mock(|when, then| {
        when.method(GET)
            .path("/v2/everything")
            .header("x-api-key", NEWSAPI_KEY);
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    })
}

pub fn mock_finnhub_search<'a>(server: &'a MockServer, query: &str, key: &str) -> Mock<'a> {
    let body = fixture("finnhub_search", key, "json");
    let query = query.to_string();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/search")
            .query_param("q", query)
            .query_param("token", FINNHUB_KEY);
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    })
}

pub fn mock_finnhub_news<'a>(server: &'a MockServer, symbol: &str) -> Mock<'a> {
    let body = fixture("finnhub_company-news", &symbol.to_lowercase(), "json");
    let symbol = symbol.to_string();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/company-news")
            .query_param("symbol", symbol)
            .query_param("token", FINNHUB_KEY);
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    })
}
