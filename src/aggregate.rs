//! Folds classified articles into a [`Report`].

use std::collections::HashMap;

use chrono::Utc;

use crate::core::FsError;
use crate::core::models::{
    Article, LabelCounts, Provider, Query, Report, ScoredArticle, SentimentLabel, SentimentResult,
};

/// Exact ties on count and confidence mass resolve in this order.
const TIE_ORDER: [SentimentLabel; 3] = [
    SentimentLabel::Neutral,
    SentimentLabel::Negative,
    SentimentLabel::Positive,
];

/// Pairs `articles` with `results` by article id and computes the overall verdict.
///
/// The two sequences must correspond 1:1. The returned articles are ordered newest first.
///
/// # Errors
///
/// Returns [`FsError::AggregationContractViolation`] if the lengths differ, an id is
/// duplicated, or an article has no result.
pub fn aggregate(
    query: Query,
    provider: Provider,
    articles: Vec<Article>,
    results: Vec<SentimentResult>,
) -> Result<Report, FsError> {
    if articles.len() != results.len() {
        return Err(FsError::AggregationContractViolation(format!(
            "{} articles but {} sentiment results",
            articles.len(),
            results.len()
        )));
    }

    let mut by_id: HashMap<String, SentimentResult> = HashMap::with_capacity(results.len());
    for r in results {
        let id = r.article_id.clone();
        if by_id.insert(id.clone(), r).is_some() {
            return Err(FsError::AggregationContractViolation(format!(
                "duplicate sentiment result for article {id}"
            )));
        }
    }

    let mut scored = Vec::with_capacity(articles.len());
    for article in articles {
        let sentiment = by_id.remove(&article.id).ok_or_else(|| {
            FsError::AggregationContractViolation(format!(
                "no sentiment result for article {}",
                article.id
            ))
        })?;
        scored.push(ScoredArticle { article, sentiment });
    }
    scored.sort_by(|a, b| b.article.published_at.cmp(&a.article.published_at));

    let mut counts = LabelCounts::default();
    let mut mass: HashMap<SentimentLabel, f64> = HashMap::new();
    for s in &scored {
        counts.increment(s.sentiment.label);
        *mass.entry(s.sentiment.label).or_default() += s.sentiment.confidence;
    }

    let no_data = scored.is_empty();
    let (overall_label, overall_confidence) = if no_data {
        (SentimentLabel::Neutral, 0.0)
    } else {
        let mass_of = |l: SentimentLabel| mass.get(&l).copied().unwrap_or(0.0);
        let label = TIE_ORDER
            .into_iter()
            .rev()
            .max_by(|a, b| {
                counts
                    .get(*a)
                    .cmp(&counts.get(*b))
                    .then(mass_of(*a).total_cmp(&mass_of(*b)))
            })
            .unwrap_or(SentimentLabel::Neutral);
        #[allow(clippy::cast_precision_loss)]
        let mean = mass_of(label) / counts.get(label) as f64;
        (label, mean.clamp(0.0, 1.0))
    };

    Ok(Report {
        query,
        provider_used: provider,
        fallback_from: None,
        resolved_symbol: None,
        articles: scored,
        overall_label,
        overall_confidence,
        counts,
        no_data,
        unclassified: 0,
        generated_at: Utc::now(),
    })
}
