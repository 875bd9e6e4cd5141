//! # Aggregator
//! Fans out to every provider at once, waits for all of them, then merges:
//! concatenate in provider order → dedup by URL (first wins) → rank → truncate.
//!
//! A provider can never take the run down with it. Errors, panics and timeouts are
//! all caught here at the boundary and turned into an empty contribution, which
//! shows up as `status: "error"` for that source.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use futures::FutureExt;
use metrics::{counter, gauge, histogram};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::NewsConfig;
use crate::ingest::providers::build_providers;
use crate::ingest::types::{NewsItem, SourceProvider};
use crate::ingest::{ensure_metrics_described, url_key};

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceHealth {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub name: String,
    pub count: usize,
    pub status: SourceHealth,
}

impl SourceStatus {
    /// `error` iff nothing came back. An empty-but-healthy source and a failed
    /// one look the same here.
    pub fn from_count(name: &str, count: usize) -> Self {
        Self {
            name: name.to_string(),
            count,
            status: if count > 0 {
                SourceHealth::Ok
            } else {
                SourceHealth::Error
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub items: Vec<NewsItem>,
    pub sources: Vec<SourceStatus>,
    pub fetched_at: DateTime<Utc>,
}

impl AggregationResult {
    /// Well-formed payload with nothing in it.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            sources: Vec::new(),
            fetched_at: Utc::now(),
        }
    }
}

/// Anything that can produce the combined feed. The HTTP layer only sees this.
#[async_trait::async_trait]
pub trait NewsFeed: Send + Sync {
    async fn latest(&self, limit: usize) -> Result<AggregationResult>;
}

pub struct Aggregator {
    providers: Vec<Arc<dyn SourceProvider>>,
    provider_timeout: Duration,
}

impl Aggregator {
    pub fn new(providers: Vec<Arc<dyn SourceProvider>>) -> Self {
        Self {
            providers,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn from_config(cfg: &NewsConfig) -> Result<Self> {
        let providers = build_providers(cfg)?;
        Ok(Self::new(providers)
            .with_provider_timeout(Duration::from_secs(cfg.server.provider_timeout_secs)))
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn aggregate(&self, limit: usize) -> AggregationResult {
        ensure_metrics_described();
        let t0 = Instant::now();

        // 1) All providers at once; every one settles before we merge.
        let batches = join_all(
            self.providers
                .iter()
                .map(|p| fetch_or_empty(p.as_ref(), self.provider_timeout)),
        )
        .await;

        // 2) Per-source status, declaration order.
        let sources = self
            .providers
            .iter()
            .zip(batches.iter())
            .map(|(p, items)| {
                counter!("news_provider_items_total", "provider" => p.name())
                    .increment(items.len() as u64);
                SourceStatus::from_count(p.name(), items.len())
            })
            .collect::<Vec<_>>();

        // 3–6) Concatenate, dedup, rank, truncate.
        let (items, dedup_cnt) = merge(batches, limit);

        // Telemetry
        let now = Utc::now();
        counter!("news_dedup_total").increment(dedup_cnt as u64);
        histogram!("news_aggregate_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        gauge!("news_last_run_ts").set(now.timestamp() as f64);

        info!(
            target: "aggregator",
            items = items.len(),
            dedup = dedup_cnt,
            failed = sources.iter().filter(|s| s.status == SourceHealth::Error).count(),
            ms = t0.elapsed().as_millis() as u64,
            "aggregation finished"
        );

        AggregationResult {
            items,
            sources,
            fetched_at: now,
        }
    }
}

#[async_trait::async_trait]
impl NewsFeed for Aggregator {
    async fn latest(&self, limit: usize) -> Result<AggregationResult> {
        Ok(self.aggregate(limit).await)
    }
}

/// Run one provider with its own fetch count; any failure mode yields `[]`.
pub async fn fetch_or_empty(provider: &dyn SourceProvider, timeout: Duration) -> Vec<NewsItem> {
    let name = provider.name();
    let fut = AssertUnwindSafe(provider.fetch_latest(provider.fetch_count())).catch_unwind();

    let failure = match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(Ok(items))) => return items,
        Ok(Ok(Err(e))) => format!("{e:#}"),
        Ok(Err(_panic)) => "provider panicked".to_string(),
        Err(_elapsed) => format!("timed out after {}ms", timeout.as_millis()),
    };

    warn!(target: "aggregator", provider = name, error = %failure, "provider degraded to empty");
    counter!("news_provider_errors_total", "provider" => name).increment(1);
    Vec::new()
}

/// Concatenate batches in order, dedup, rank and keep the first `limit`.
/// Returns the kept items and how many duplicates were dropped.
pub fn merge(batches: Vec<Vec<NewsItem>>, limit: usize) -> (Vec<NewsItem>, usize) {
    let all = batches.into_iter().flatten().collect::<Vec<_>>();
    let (mut unique, dedup_cnt) = dedup_by_url(all);
    rank(&mut unique);
    unique.truncate(limit);
    (unique, dedup_cnt)
}

/// Keep the first item per normalized URL (and per id). Order is preserved.
pub fn dedup_by_url(items: Vec<NewsItem>) -> (Vec<NewsItem>, usize) {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut keep = Vec::with_capacity(items.len());
    let mut dropped = 0usize;

    for it in items {
        if seen_ids.contains(&it.id) || !seen_urls.insert(url_key(&it.url)) {
            dropped += 1;
            continue;
        }
        seen_ids.insert(it.id.clone());
        keep.push(it);
    }
    (keep, dropped)
}

/// Hot first, then newer date, then higher score (missing = 0).
pub fn compare_rank(a: &NewsItem, b: &NewsItem) -> Ordering {
    b.hot()
        .cmp(&a.hot())
        .then_with(|| b.date.cmp(&a.date))
        .then_with(|| b.score_or_zero().cmp(&a.score_or_zero()))
}

/// Stable sort by `compare_rank`; full ties keep their incoming order.
pub fn rank(items: &mut [NewsItem]) {
    items.sort_by(compare_rank);
}
