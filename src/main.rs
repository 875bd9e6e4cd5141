//! AI News Service: binary entrypoint.
//! Boots the Axum HTTP server: config, providers, `/api/news`, `/metrics`.

use ai_news_aggregator::{api, config::NewsConfig, init_tracing, metrics::Metrics};
use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = NewsConfig::load_default()?;
    info!(
        default_limit = cfg.server.default_limit,
        feeds = cfg.rss.feeds.len(),
        arxiv = cfg.arxiv.enabled,
        "news config loaded"
    );

    let state = api::AppState::from_config(&cfg)?;
    let mut router = api::router(state);

    match Metrics::init() {
        Ok(metrics) => router = router.merge(metrics.router()),
        Err(e) => warn!(error = ?e, "metrics disabled"),
    }

    Ok(router.into())
}
