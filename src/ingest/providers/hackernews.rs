// src/ingest/providers/hackernews.rs
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::config::news::HackerNewsConfig;
use crate::ingest::http::get_json;
use crate::ingest::types::{NewsItem, SourceProvider};
use crate::ingest::{date_from_unix, http_url, normalize_title};
use crate::relevance::RelevanceFilter;

pub const NAME: &str = "Hacker News";

/// Raw item from `/item/{id}.json`. Every field is optional upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct HnStory {
    pub id: u64,
    pub title: Option<String>,
    pub url: Option<String>,
    pub time: Option<i64>,
    pub score: Option<i64>,
}

pub struct HackerNewsProvider {
    client: Client,
    cfg: HackerNewsConfig,
    relevance: Arc<RelevanceFilter>,
}

impl HackerNewsProvider {
    pub fn new(client: Client, cfg: HackerNewsConfig, relevance: Arc<RelevanceFilter>) -> Self {
        Self {
            client,
            cfg,
            relevance,
        }
    }

    fn base(&self) -> &str {
        self.cfg.base_url.trim_end_matches('/')
    }

    // A failed or `null` item is simply absent.
    async fn fetch_story(&self, id: u64) -> Option<HnStory> {
        let url = format!("{}/item/{}.json", self.base(), id);
        match get_json::<Option<HnStory>>(&self.client, &url).await {
            Ok(story) => story,
            Err(e) => {
                debug!(target: "ingest", error = ?e, id, "hn item skipped");
                None
            }
        }
    }
}

/// Stories → items: keep relevant stories that link out, in rank order, up to `limit`.
pub fn stories_to_items(
    stories: Vec<HnStory>,
    relevance: &RelevanceFilter,
    hot_threshold: i64,
    limit: usize,
) -> Vec<NewsItem> {
    stories
        .into_iter()
        .filter_map(|s| {
            let title = normalize_title(s.title.as_deref()?);
            if title.is_empty() || !relevance.is_relevant(&title) {
                return None;
            }
            let url = http_url(s.url.as_deref()?)?;
            let date = date_from_unix(s.time?)?;
            let score = s.score.unwrap_or(0);
            Some(NewsItem {
                id: format!("hn-{}", s.id),
                title,
                url,
                source: NAME.to_string(),
                date,
                is_hot: Some(score > hot_threshold),
                score: Some(score),
            })
        })
        .take(limit)
        .collect()
}

#[async_trait]
impl SourceProvider for HackerNewsProvider {
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<NewsItem>> {
        let ids: Vec<u64> =
            get_json(&self.client, &format!("{}/topstories.json", self.base())).await?;

        let stories = join_all(
            ids.iter()
                .take(self.cfg.candidates)
                .map(|id| self.fetch_story(*id)),
        )
        .await;

        let items = stories_to_items(
            stories.into_iter().flatten().collect(),
            &self.relevance,
            self.cfg.hot_threshold,
            limit,
        );
        debug!(target: "ingest", provider = NAME, kept = items.len(), "hn stories resolved");
        Ok(items)
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn fetch_count(&self) -> usize {
        self.cfg.fetch_count
    }
}
