use serde::Deserialize;

/// `GET /v2/everything` response. Articles are decoded one by one so a single bad entry
/// does not fail the batch.
#[derive(Deserialize)]
pub(crate) struct EverythingEnvelope {
    pub(crate) status: Option<String>,
    pub(crate) code: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) articles: Option<Vec<serde_json::Value>>,
}

/// One NewsAPI article as delivered by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewsApiArticle {
    #[serde(default)]
    pub source: Option<NewsApiSource>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(rename = "publishedAt")]
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewsApiSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
