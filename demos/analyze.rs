use std::sync::Arc;

use finsent_rs::{
    Classification, ClassifierError, FsClient, ProviderPreference, SentimentClassifier,
    SentimentLabel,
};
use tracing_subscriber::EnvFilter;

/// Stand-in for a real model: counts a handful of market words.
struct Lexicon;

impl SentimentClassifier for Lexicon {
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        const UP: &[&str] = &["beat", "surge", "record", "rally", "gain", "upgrade"];
        const DOWN: &[&str] = &["miss", "drop", "fall", "lawsuit", "cut", "downgrade"];
        let t = text.to_lowercase();
        let up = UP.iter().filter(|w| t.contains(*w)).count();
        let down = DOWN.iter().filter(|w| t.contains(*w)).count();
        let (label, margin) = match up.cmp(&down) {
            std::cmp::Ordering::Greater => (SentimentLabel::Positive, up - down),
            std::cmp::Ordering::Less => (SentimentLabel::Negative, down - up),
            std::cmp::Ordering::Equal => (SentimentLabel::Neutral, 1),
        };
        #[allow(clippy::cast_precision_loss)]
        let confidence = (0.5 + 0.2 * margin as f64).min(0.99);
        Ok(Classification { label, confidence })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let company = std::env::args().nth(1).unwrap_or_else(|| "AAPL".to_string());
    let preference = match std::env::args().nth(2) {
        Some(p) => p.parse()?,
        None => ProviderPreference::Auto,
    };

    // 1. Keys come from the environment; a missing key disables that provider.
    let mut builder = FsClient::builder().classifier(Arc::new(Lexicon));
    if let Ok(key) = std::env::var("NEWSAPI_KEY") {
        builder = builder.newsapi_key(key);
    }
    if let Ok(key) = std::env::var("FINNHUB_KEY") {
        builder = builder.finnhub_key(key);
    }
    let client = builder.build()?;

    // 2. Analyze the last week of news.
    let report = client.analyze(&company, preference, 7).await?;

    println!("--- Sentiment for {} ---", report.query.company_text());
    print!("Source: {}", report.provider_used);
    if let Some(from) = report.fallback_from {
        print!(" (fell back from {from})");
    }
    println!();
    if let Some(symbol) = report.resolved_symbol.as_ref().and_then(|r| r.ticker_symbol.as_deref()) {
        println!("Symbol: {symbol}");
    }
    if report.no_data {
        println!("No articles found.");
        return Ok(());
    }
    println!(
        "Overall: {} ({:.0}% confidence)",
        report.overall_label,
        report.overall_confidence * 100.0
    );
    for label in SentimentLabel::ALL {
        println!(
            "  {label:<8} {:>3} ({:.1}%)",
            report.counts.get(label),
            report.share(label)
        );
    }
    if report.unclassified > 0 {
        println!("  {} article(s) could not be classified", report.unclassified);
    }
    println!();

    // 3. The three strongest headlines on each side.
    for label in [SentimentLabel::Positive, SentimentLabel::Negative] {
        println!("Top {label} headlines:");
        for scored in report.top_headlines(label, 3) {
            println!(
                "  [{:.2}] {} ({})",
                scored.sentiment.confidence, scored.article.title, scored.article.source_name
            );
        }
    }

    // 4. A second call within the cache TTL is served locally.
    let again = client.analyze(&company, preference, 7).await?;
    assert_eq!(again.generated_at, report.generated_at);
    println!();
    println!("Cached reports: {}", client.cache().len().await);

    Ok(())
}
