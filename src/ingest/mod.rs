// src/ingest/mod.rs
pub mod feed;
pub mod http;
pub mod providers;
pub mod types;

use chrono::{DateTime, NaiveDate, Utc};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "news_provider_items_total",
            "Items returned by each provider before dedup."
        );
        describe_counter!(
            "news_provider_errors_total",
            "Provider failures (error, panic or timeout) degraded to empty."
        );
        describe_counter!(
            "news_feed_errors_total",
            "Sub-feed failures inside a provider (one subreddit, one RSS feed)."
        );
        describe_counter!("news_dedup_total", "Items removed by URL deduplication.");
        describe_histogram!("news_aggregate_ms", "Aggregation wall time in milliseconds.");
        describe_gauge!("news_last_run_ts", "Unix ts when the aggregator last ran.");
    });
}

/// Normalize a display title: decode entities, strip tags, collapse whitespace.
pub fn normalize_title(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z][^>]*>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Dedup key: lower-cased URL with one trailing slash removed.
pub fn url_key(url: &str) -> String {
    let lower = url.to_lowercase();
    match lower.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

/// Absolute http(s) URL check. Returns the trimmed URL when valid.
pub fn http_url(raw: &str) -> Option<String> {
    let t = raw.trim();
    let parsed = reqwest::Url::parse(t).ok()?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Some(t.to_string()),
        _ => None,
    }
}

/// UTC calendar day of a unix timestamp.
pub fn date_from_unix(secs: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
