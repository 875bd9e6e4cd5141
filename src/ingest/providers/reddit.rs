// src/ingest/providers/reddit.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use metrics::counter;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::news::RedditConfig;
use crate::ingest::http::get_json;
use crate::ingest::types::{NewsItem, SourceProvider};
use crate::ingest::{date_from_unix, http_url, normalize_title};
use crate::relevance::RelevanceFilter;

pub const NAME: &str = "Reddit";
const PERMALINK_BASE: &str = "https://reddit.com";

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

// Children stay untyped so one malformed post does not sink the listing.
#[derive(Debug, Deserialize)]
struct Child {
    data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    pub permalink: String,
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
    pub subreddit: String,
    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub selftext: String,
}

pub struct RedditProvider {
    client: Client,
    cfg: RedditConfig,
    relevance: Arc<RelevanceFilter>,
}

impl RedditProvider {
    pub fn new(client: Client, cfg: RedditConfig, relevance: Arc<RelevanceFilter>) -> Self {
        Self {
            client,
            cfg,
            relevance,
        }
    }

    async fn fetch_subreddit(&self, subreddit: &str) -> Result<Vec<NewsItem>> {
        let url = format!(
            "{}/r/{}/hot.json?limit={}",
            self.cfg.base_url.trim_end_matches('/'),
            subreddit,
            self.cfg.per_feed_limit
        );
        let body: serde_json::Value = get_json(&self.client, &url).await?;
        let posts = parse_listing(body).with_context(|| format!("r/{subreddit} listing"))?;
        Ok(posts_to_items(posts, &self.relevance, &self.cfg))
    }
}

/// Decode a listing, dropping children that do not look like posts.
pub fn parse_listing(body: serde_json::Value) -> Result<Vec<RedditPost>> {
    let listing: Listing = serde_json::from_value(body).context("decoding reddit listing")?;
    Ok(listing
        .data
        .children
        .into_iter()
        .filter_map(|c| serde_json::from_value::<RedditPost>(c.data).ok())
        .collect())
}

/// Posts → items for one subreddit, in listing order.
pub fn posts_to_items(
    posts: Vec<RedditPost>,
    relevance: &RelevanceFilter,
    cfg: &RedditConfig,
) -> Vec<NewsItem> {
    posts
        .into_iter()
        .filter(|p| !p.is_self || p.selftext.chars().count() > cfg.min_selftext_len)
        .filter_map(|p| {
            let title = normalize_title(&p.title);
            if title.is_empty()
                || !relevance.is_relevant_any(&[title.as_str(), p.selftext.as_str()])
            {
                return None;
            }
            let url = if p.is_self {
                http_url(&format!("{PERMALINK_BASE}{}", p.permalink))?
            } else {
                http_url(p.url.as_deref()?)?
            };
            let date = date_from_unix(p.created_utc.floor() as i64)?;
            Some(NewsItem {
                id: format!("reddit-{}", p.id),
                title,
                url,
                source: format!("r/{}", p.subreddit),
                date,
                is_hot: Some(p.score > cfg.hot_threshold),
                score: Some(p.score),
            })
        })
        .collect()
}

#[async_trait]
impl SourceProvider for RedditProvider {
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<NewsItem>> {
        let results = join_all(
            self.cfg
                .subreddits
                .iter()
                .map(|s| async move { (s.as_str(), self.fetch_subreddit(s).await) }),
        )
        .await;

        let mut all = Vec::new();
        for (subreddit, res) in results {
            match res {
                Ok(mut items) => {
                    debug!(target: "ingest", subreddit, kept = items.len(), "subreddit fetched");
                    all.append(&mut items);
                }
                Err(e) => {
                    warn!(target: "ingest", error = ?e, subreddit, "subreddit error");
                    counter!("news_feed_errors_total", "feed" => format!("r/{subreddit}"))
                        .increment(1);
                }
            }
        }

        // Stable: equal scores keep subreddit declaration order.
        all.sort_by(|a, b| b.score_or_zero().cmp(&a.score_or_zero()));
        all.truncate(limit);
        Ok(all)
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn fetch_count(&self) -> usize {
        self.cfg.fetch_count
    }
}
