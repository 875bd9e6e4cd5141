// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod relevance;

// ---- Re-exports for stable public API ----
pub use crate::aggregator::{AggregationResult, Aggregator, NewsFeed, SourceHealth, SourceStatus};
pub use crate::api::router;
pub use crate::config::NewsConfig;
pub use crate::ingest::types::{NewsItem, SourceProvider};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a tracing subscriber unless the host already did.
/// `RUST_LOG` wins; `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ai_news_aggregator=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()
    };
    // Already installed (e.g. by the deployment runtime) is fine.
    let _ = res;
}
