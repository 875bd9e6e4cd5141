// src/ingest/providers/arxiv.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::sync::Arc;

use crate::config::news::ArxivConfig;
use crate::ingest::feed::{parse_entries, parse_feed_date, FeedEntry};
use crate::ingest::http::get_text;
use crate::ingest::types::{NewsItem, SourceProvider};
use crate::ingest::{http_url, normalize_title};
use crate::relevance::RelevanceFilter;

pub const NAME: &str = "ArXiv";
const TITLE_PREFIX: &str = "📄 ";

/// Newest preprints from the configured categories. Papers are never hot.
pub struct ArxivProvider {
    client: Client,
    cfg: ArxivConfig,
    relevance: Arc<RelevanceFilter>,
}

impl ArxivProvider {
    pub fn new(client: Client, cfg: ArxivConfig, relevance: Arc<RelevanceFilter>) -> Self {
        Self {
            client,
            cfg,
            relevance,
        }
    }

    pub fn query_url(&self) -> Result<Url> {
        let search = self
            .cfg
            .categories
            .iter()
            .map(|c| format!("cat:{c}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        let max_results = self.cfg.max_results.to_string();
        Url::parse_with_params(
            &self.cfg.base_url,
            &[
                ("search_query", search.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
                ("max_results", max_results.as_str()),
            ],
        )
        .context("building arxiv query url")
    }
}

/// Entries → items: first `scan_limit` entries, relevance on title or abstract.
pub fn entries_to_items(
    entries: Vec<FeedEntry>,
    relevance: &RelevanceFilter,
    scan_limit: usize,
    limit: usize,
) -> Vec<NewsItem> {
    entries
        .into_iter()
        .take(scan_limit)
        .filter_map(|e| {
            let title = normalize_title(e.title.as_deref()?);
            if title.is_empty() {
                return None;
            }
            let summary = normalize_title(e.summary.as_deref().unwrap_or_default());
            if !relevance.is_relevant_any(&[title.as_str(), summary.as_str()]) {
                return None;
            }
            let abs = e.id.as_deref().or(e.link.as_deref())?;
            let url = http_url(&upgrade_scheme(abs))?;
            let date = parse_feed_date(e.published.as_deref()?)?;
            let paper_id = url.trim_end_matches('/').rsplit('/').next()?.to_string();
            Some(NewsItem {
                id: format!("arxiv-{paper_id}"),
                title: format!("{TITLE_PREFIX}{title}"),
                url,
                source: NAME.to_string(),
                date,
                is_hot: Some(false),
                score: None,
            })
        })
        .take(limit)
        .collect()
}

fn upgrade_scheme(url: &str) -> String {
    match url.trim().strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.trim().to_string(),
    }
}

#[async_trait]
impl SourceProvider for ArxivProvider {
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<NewsItem>> {
        let url = self.query_url()?;
        let body = get_text(&self.client, url.as_str()).await?;
        let entries = parse_entries(&body).context("arxiv response")?;
        Ok(entries_to_items(
            entries,
            &self.relevance,
            self.cfg.scan_limit,
            limit,
        ))
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn fetch_count(&self) -> usize {
        self.cfg.fetch_count
    }
}
