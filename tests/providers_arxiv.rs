// tests/providers_arxiv.rs
//
// arXiv provider against a mocked export API.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;

use ai_news_aggregator::config::news::{ArxivConfig, HttpConfig};
use ai_news_aggregator::ingest::http::build_client;
use ai_news_aggregator::ingest::providers::arxiv::ArxivProvider;
use ai_news_aggregator::relevance::RelevanceFilter;
use ai_news_aggregator::SourceProvider;

use common::{arxiv_router, serve};

fn provider(base: &str) -> ArxivProvider {
    let client = build_client(&HttpConfig::default()).expect("client");
    let cfg = ArxivConfig {
        enabled: true,
        base_url: format!("{base}/api/query"),
        ..ArxivConfig::default()
    };
    ArxivProvider::new(client, cfg, Arc::new(RelevanceFilter::default()))
}

#[tokio::test]
async fn maps_relevant_papers() {
    let base = serve(arxiv_router()).await;
    let items = provider(&base).fetch_latest(10).await.expect("fetch");

    let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["arxiv-2601.10001v1", "arxiv-2601.10002v2"]);

    let first = &items[0];
    assert_eq!(first.title, "📄 Agentic Planning with Language Models");
    assert_eq!(first.url, "https://arxiv.org/abs/2601.10001v1");
    assert_eq!(first.source, "ArXiv");
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2026, 1, 27).expect("day"));
    assert_eq!(first.is_hot, Some(false));
    assert!(first.score.is_none());

    // Relevant through its abstract only.
    assert_eq!(items[1].date, NaiveDate::from_ymd_opt(2026, 1, 26).expect("day"));
}

#[tokio::test]
async fn limit_is_respected() {
    let base = serve(arxiv_router()).await;
    assert_eq!(provider(&base).fetch_latest(1).await.expect("fetch").len(), 1);
}

#[tokio::test]
async fn upstream_error_propagates() {
    let base = serve(axum::Router::new()).await;
    assert!(provider(&base).fetch_latest(10).await.is_err());
}
