// src/config/news.rs
//! Runtime configuration for the aggregator, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) gives the stock
//! source set and thresholds.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::relevance::{RelevanceFilter, DEFAULT_KEYWORDS};

pub const ENV_NEWS_CONFIG_PATH: &str = "NEWS_CONFIG_PATH";
pub const DEFAULT_NEWS_CONFIG_PATH: &str = "config/news.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub relevance: RelevanceConfig,
    pub hackernews: HackerNewsConfig,
    pub reddit: RedditConfig,
    pub rss: RssConfig,
    pub arxiv: ArxivConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Items returned by `GET /api/news`.
    pub default_limit: usize,
    pub max_age_secs: u64,
    pub stale_while_revalidate_secs: u64,
    /// Upper bound for a single provider call at the aggregator boundary.
    pub provider_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_age_secs: 300,
            stale_while_revalidate_secs: 600,
            provider_timeout_secs: 20,
        }
    }
}

impl ServerConfig {
    pub fn cache_control(&self) -> String {
        format!(
            "public, s-maxage={}, stale-while-revalidate={}",
            self.max_age_secs, self.stale_while_revalidate_secs
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "ai-news-aggregator/0.1".to_string(),
            connect_timeout_secs: 4,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelevanceConfig {
    pub keywords: Vec<String>,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RelevanceConfig {
    pub fn filter(&self) -> RelevanceFilter {
        RelevanceFilter::new(&self.keywords)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HackerNewsConfig {
    pub enabled: bool,
    pub base_url: String,
    pub fetch_count: usize,
    /// How many top-story ids are resolved per run.
    pub candidates: usize,
    pub hot_threshold: i64,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://hacker-news.firebaseio.com/v0".to_string(),
            fetch_count: 10,
            candidates: 100,
            hot_threshold: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub enabled: bool,
    pub base_url: String,
    pub fetch_count: usize,
    pub subreddits: Vec<String>,
    pub per_feed_limit: usize,
    pub hot_threshold: i64,
    /// Self-posts need a body strictly longer than this (in characters).
    pub min_selftext_len: usize,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://www.reddit.com".to_string(),
            fetch_count: 10,
            subreddits: ["MachineLearning", "artificial", "LocalLLaMA", "ChatGPT", "singularity"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            per_feed_limit: 15,
            hot_threshold: 500,
            min_selftext_len: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedSpec {
    pub name: String,
    pub url: String,
}

impl FeedSpec {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RssConfig {
    pub enabled: bool,
    pub fetch_count: usize,
    pub per_feed_cap: usize,
    pub feeds: Vec<FeedSpec>,
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fetch_count: 10,
            per_feed_cap: 5,
            feeds: vec![
                FeedSpec::new("OpenAI Blog", "https://openai.com/blog/rss.xml"),
                FeedSpec::new("Anthropic", "https://www.anthropic.com/rss.xml"),
                FeedSpec::new("Google AI Blog", "https://blog.google/technology/ai/rss/"),
                FeedSpec::new("DeepMind", "https://deepmind.google/blog/rss.xml"),
                FeedSpec::new("Hugging Face", "https://huggingface.co/blog/feed.xml"),
                FeedSpec::new(
                    "MIT AI News",
                    "https://news.mit.edu/rss/topic/artificial-intelligence2",
                ),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArxivConfig {
    pub enabled: bool,
    pub base_url: String,
    pub fetch_count: usize,
    pub categories: Vec<String>,
    pub max_results: usize,
    /// Entries considered per response, newest first.
    pub scan_limit: usize,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://export.arxiv.org/api/query".to_string(),
            fetch_count: 10,
            categories: ["cs.AI", "cs.LG", "cs.CL", "cs.CV", "stat.ML"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_results: 50,
            scan_limit: 20,
        }
    }
}

impl NewsConfig {
    /// Parse TOML and sanitize.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: NewsConfig = toml::from_str(s).context("parsing news config toml")?;
        Ok(cfg.sanitized())
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading news config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks:
    /// 1) $NEWS_CONFIG_PATH
    /// 2) config/news.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_NEWS_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("NEWS_CONFIG_PATH points to non-existent path"));
            }
        }
        let default_p = PathBuf::from(DEFAULT_NEWS_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::default())
    }

    fn sanitized(mut self) -> Self {
        let s = &mut self.server;
        s.default_limit = s.default_limit.max(1);
        s.provider_timeout_secs = s.provider_timeout_secs.max(1);

        let h = &mut self.http;
        h.connect_timeout_secs = h.connect_timeout_secs.max(1);
        h.timeout_secs = h.timeout_secs.max(1);
        if h.user_agent.trim().is_empty() {
            h.user_agent = HttpConfig::default().user_agent;
        }

        self.hackernews.fetch_count = self.hackernews.fetch_count.max(1);
        self.hackernews.candidates = self.hackernews.candidates.max(1);

        self.reddit.fetch_count = self.reddit.fetch_count.max(1);
        self.reddit.per_feed_limit = self.reddit.per_feed_limit.max(1);
        self.reddit.subreddits = clean_list(std::mem::take(&mut self.reddit.subreddits));

        self.rss.fetch_count = self.rss.fetch_count.max(1);
        self.rss.per_feed_cap = self.rss.per_feed_cap.max(1);
        self.rss
            .feeds
            .retain(|f| !f.name.trim().is_empty() && !f.url.trim().is_empty());

        self.arxiv.fetch_count = self.arxiv.fetch_count.max(1);
        self.arxiv.max_results = self.arxiv.max_results.max(1);
        self.arxiv.scan_limit = self.arxiv.scan_limit.max(1);
        self.arxiv.categories = clean_list(std::mem::take(&mut self.arxiv.categories));

        self
    }
}

// Trim, drop blanks, drop repeats; keeps first-seen order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}
