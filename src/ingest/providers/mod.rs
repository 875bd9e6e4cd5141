// src/ingest/providers/mod.rs
pub mod arxiv;
pub mod hackernews;
pub mod reddit;
pub mod rss;

use anyhow::Result;
use std::sync::Arc;

use crate::config::NewsConfig;
use crate::ingest::http::build_client;
use crate::ingest::types::SourceProvider;

/// Enabled providers in declaration order: Hacker News, Reddit, RSS, arXiv.
/// This order is also the dedup priority.
pub fn build_providers(cfg: &NewsConfig) -> Result<Vec<Arc<dyn SourceProvider>>> {
    let client = build_client(&cfg.http)?;
    let relevance = Arc::new(cfg.relevance.filter());

    let mut out: Vec<Arc<dyn SourceProvider>> = Vec::new();
    if cfg.hackernews.enabled {
        out.push(Arc::new(hackernews::HackerNewsProvider::new(
            client.clone(),
            cfg.hackernews.clone(),
            relevance.clone(),
        )));
    }
    if cfg.reddit.enabled {
        out.push(Arc::new(reddit::RedditProvider::new(
            client.clone(),
            cfg.reddit.clone(),
            relevance.clone(),
        )));
    }
    if cfg.rss.enabled {
        out.push(Arc::new(rss::RssProvider::new(
            client.clone(),
            cfg.rss.clone(),
            relevance.clone(),
        )));
    }
    if cfg.arxiv.enabled {
        out.push(Arc::new(arxiv::ArxivProvider::new(
            client,
            cfg.arxiv.clone(),
            relevance,
        )));
    }
    Ok(out)
}
