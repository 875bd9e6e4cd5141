// src/ingest/types.rs
use anyhow::Result;
use chrono::NaiveDate;

/// Items a provider returns when the aggregator does not ask for a specific count.
pub const DEFAULT_FETCH_COUNT: usize = 10;

/// Canonical article record shared by every provider.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,     // e.g. "hn-41234567", "reddit-1abcd2"
    pub title: String,  // normalized, never empty
    pub url: String,    // absolute http(s)
    pub source: String, // e.g. "Hacker News", "r/LocalLLaMA", "OpenAI Blog"
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hot: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
}

impl NewsItem {
    pub fn hot(&self) -> bool {
        self.is_hot.unwrap_or(false)
    }

    pub fn score_or_zero(&self) -> i64 {
        self.score.unwrap_or(0)
    }
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<NewsItem>>;
    fn name(&self) -> &'static str;

    /// How many items the aggregator requests from this provider per run.
    fn fetch_count(&self) -> usize {
        DEFAULT_FETCH_COUNT
    }
}
