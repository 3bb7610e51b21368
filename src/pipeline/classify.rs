//! Bounded, order-preserving headline classification.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::core::models::{Article, SentimentResult};
use crate::core::services::SentimentClassifier;
use crate::core::{FsClient, FsError};

pub(super) struct Classified {
    /// Articles the classifier succeeded on, in input order.
    pub(super) articles: Vec<Article>,
    /// One result per entry of `articles`, same order.
    pub(super) results: Vec<SentimentResult>,
    pub(super) unclassified: usize,
}

/// Classifies every headline on blocking threads, at most `classify_concurrency` at a time.
///
/// A failing article is dropped and counted; it never aborts the batch.
pub(super) async fn classify_all(
    client: &FsClient,
    articles: Vec<Article>,
) -> Classified {
    let tasks = articles.iter().map(|article| {
        classify_task(
            client.classify_permits.clone(),
            client.classifier.clone(),
            article.id.clone(),
            article.title.clone(),
        )
    });
    let outcomes = join_all(tasks).await;

    let mut out = Classified {
        articles: Vec::with_capacity(articles.len()),
        results: Vec::with_capacity(articles.len()),
        unclassified: 0,
    };
    for (article, outcome) in articles.into_iter().zip(outcomes) {
        match outcome {
            Ok(result) => {
                out.articles.push(article);
                out.results.push(result);
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_e, "article left unclassified");
                out.unclassified += 1;
            }
        }
    }
    out
}

async fn classify_task(
    permits: Arc<Semaphore>,
    classifier: Arc<dyn SentimentClassifier>,
    article_id: String,
    title: String,
) -> Result<SentimentResult, FsError> {
    let permit = permits
        .acquire_owned()
        .await
        .map_err(|_| FsError::ClassifierUnavailable {
            article_id: article_id.clone(),
            reason: "classifier pool closed".into(),
        })?;
    let id = article_id.clone();
    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        classify_one(classifier.as_ref(), &id, &title)
    })
    .await
    .map_err(|e| FsError::ClassifierUnavailable {
        article_id,
        reason: format!("classifier task failed: {e}"),
    })?
}

fn classify_one(
    classifier: &dyn SentimentClassifier,
    article_id: &str,
    text: &str,
) -> Result<SentimentResult, FsError> {
    let unavailable = |reason: String| FsError::ClassifierUnavailable {
        article_id: article_id.to_string(),
        reason,
    };
    let c = classifier.classify(text).map_err(|e| unavailable(e.0))?;
    if !c.confidence.is_finite() {
        return Err(unavailable(format!("confidence {} is not finite", c.confidence)));
    }
    Ok(SentimentResult {
        article_id: article_id.to_string(),
        label: c.label,
        confidence: c.confidence.clamp(0.0, 1.0),
    })
}
