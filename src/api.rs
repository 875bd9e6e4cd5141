use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::aggregator::{AggregationResult, Aggregator, NewsFeed};
use crate::config::NewsConfig;

#[derive(Clone)]
pub struct AppState {
    feed: Arc<dyn NewsFeed>,
    default_limit: usize,
    cache_control: HeaderValue,
}

impl AppState {
    pub fn new(feed: Arc<dyn NewsFeed>, default_limit: usize, cache_control: &str) -> Self {
        let cache_control = HeaderValue::from_str(cache_control)
            .unwrap_or_else(|_| HeaderValue::from_static("public, s-maxage=300"));
        Self {
            feed,
            default_limit,
            cache_control,
        }
    }

    /// Live providers wired from config.
    pub fn from_config(cfg: &NewsConfig) -> anyhow::Result<Self> {
        let aggregator = Aggregator::from_config(cfg)?;
        info!(target: "api", sources = ?aggregator.source_names(), "aggregator ready");
        Ok(Self::new(
            Arc::new(aggregator),
            cfg.server.default_limit,
            &cfg.server.cache_control(),
        ))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/news", get(get_news))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn get_news(State(state): State<AppState>) -> Response {
    let feed = state.feed.clone();
    let limit = state.default_limit;

    // Own task, so even a panic deep in the merge comes back as a JoinError.
    let outcome = tokio::spawn(async move { feed.latest(limit).await }).await;

    let failure = match outcome {
        Ok(Ok(result)) => {
            return (
                [(header::CACHE_CONTROL, state.cache_control.clone())],
                Json(result),
            )
                .into_response();
        }
        Ok(Err(e)) => format!("{e:#}"),
        Err(join_err) => format!("aggregation task failed: {join_err}"),
    };

    error!(target: "api", error = %failure, "news aggregation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))],
        Json(AggregationResult::empty()),
    )
        .into_response()
}
