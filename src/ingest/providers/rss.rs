// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use metrics::counter;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::news::{FeedSpec, RssConfig};
use crate::ingest::feed::{parse_entries, parse_feed_date, FeedEntry};
use crate::ingest::http::get_text;
use crate::ingest::types::{NewsItem, SourceProvider};
use crate::ingest::{http_url, normalize_title, today};
use crate::relevance::{anon_hash, RelevanceFilter};

pub const NAME: &str = "RSS Feeds";

/// Official blogs and news feeds. Every item is treated as notable.
pub struct RssProvider {
    client: Client,
    cfg: RssConfig,
    relevance: Arc<RelevanceFilter>,
}

impl RssProvider {
    pub fn new(client: Client, cfg: RssConfig, relevance: Arc<RelevanceFilter>) -> Self {
        Self {
            client,
            cfg,
            relevance,
        }
    }

    async fn fetch_feed(&self, feed: &FeedSpec) -> Result<Vec<NewsItem>> {
        let body = get_text(&self.client, &feed.url).await?;
        let entries = parse_entries(&body).with_context(|| format!("feed '{}'", feed.name))?;
        Ok(entries_to_items(
            entries,
            &feed.name,
            &self.relevance,
            self.cfg.per_feed_cap,
            today(),
        ))
    }
}

/// `rss-<feed-slug>-<link-hash>`; stable for the same feed + link.
pub fn item_id(feed_name: &str, link: &str) -> String {
    let slug = feed_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    let hash = anon_hash(link);
    format!("rss-{}-{}", slug, &hash[..10])
}

/// Entries of one feed → at most `cap` items, document order.
/// Entries without a title or a usable link are dropped; a missing or
/// unparseable date becomes `fallback_date`.
pub fn entries_to_items(
    entries: Vec<FeedEntry>,
    feed_name: &str,
    relevance: &RelevanceFilter,
    cap: usize,
    fallback_date: NaiveDate,
) -> Vec<NewsItem> {
    entries
        .into_iter()
        .filter_map(|e| {
            let title = normalize_title(e.title.as_deref()?);
            if title.is_empty() {
                return None;
            }
            let url = http_url(e.link.as_deref()?)?;
            let summary = e.summary.as_deref().unwrap_or_default();
            if !relevance.is_relevant_any(&[title.as_str(), summary]) {
                return None;
            }
            let date = e
                .published
                .as_deref()
                .and_then(parse_feed_date)
                .unwrap_or(fallback_date);
            Some(NewsItem {
                id: item_id(feed_name, &url),
                title,
                url,
                source: feed_name.to_string(),
                date,
                is_hot: Some(true),
                score: None,
            })
        })
        // Cap counts kept items, not raw entries.
        .take(cap)
        .collect()
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<NewsItem>> {
        let results = join_all(
            self.cfg
                .feeds
                .iter()
                .map(|f| async move { (f, self.fetch_feed(f).await) }),
        )
        .await;

        let mut all = Vec::new();
        for (feed, res) in results {
            match res {
                Ok(mut items) => {
                    debug!(target: "ingest", feed = %feed.name, kept = items.len(), "feed fetched");
                    all.append(&mut items);
                }
                Err(e) => {
                    warn!(target: "ingest", error = ?e, feed = %feed.name, "feed error");
                    counter!("news_feed_errors_total", "feed" => feed.name.clone()).increment(1);
                }
            }
        }

        // Newest first; stable for same-day posts.
        all.sort_by(|a, b| b.date.cmp(&a.date));
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

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: Option<&str>, link: Option<&str>, published: Option<&str>) -> FeedEntry {
        FeedEntry {
            title: title.map(str::to_string),
            link: link.map(str::to_string),
            published: published.map(str::to_string),
            ..Default::default()
        }
    }

    fn fallback() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    #[test]
    fn ids_are_stable_and_namespaced() {
        let a = item_id("Google AI Blog", "https://blog.google/a");
        assert!(a.starts_with("rss-google-ai-blog-"));
        assert_eq!(a.len(), "rss-google-ai-blog-".len() + 10);
        assert_eq!(a, item_id("Google AI Blog", "https://blog.google/a"));
        assert_ne!(a, item_id("Google AI Blog", "https://blog.google/b"));
    }

    #[test]
    fn malformed_entries_dropped_and_dates_fall_back() {
        let rel = RelevanceFilter::default();
        let items = entries_to_items(
            vec![
                entry(
                    Some("Gemini update"),
                    Some("https://g.example/1"),
                    Some("Mon, 26 Jan 2026 08:00:00 +0000"),
                ),
                entry(None, Some("https://g.example/2"), None),
                entry(Some("Gemini update 2"), None, None),
                entry(Some("Gemini update 3"), Some("https://g.example/3"), Some("garbage")),
            ],
            "Google AI Blog",
            &rel,
            5,
            fallback(),
        );
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].date, NaiveDate::from_ymd_opt(2026, 1, 26).unwrap());
        assert_eq!(items[1].date, fallback());
        assert!(items.iter().all(|i| i.is_hot == Some(true) && i.score.is_none()));
        assert!(items.iter().all(|i| i.source == "Google AI Blog"));
    }

    #[test]
    fn cap_counts_only_kept_items() {
        let rel = RelevanceFilter::new(["model"]);
        let mut entries = vec![entry(Some("Company picnic"), Some("https://x.example/p"), None)];
        for i in 0..8 {
            entries.push(entry(
                Some(&format!("Model card {i}")),
                Some(&format!("https://x.example/{i}")),
                None,
            ));
        }
        let items = entries_to_items(entries, "Lab", &rel, 5, fallback());
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].title, "Model card 0");
    }
}
