// tests/common/mod.rs
//
// In-process stand-ins for the upstream providers. Each test binds its own
// listener on 127.0.0.1:0, so tests can run in parallel.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use ai_news_aggregator::config::{FeedSpec, NewsConfig};

pub const OPENAI_RSS: &str = include_str!("../fixtures/openai_rss.xml");
pub const DEEPMIND_ATOM: &str = include_str!("../fixtures/deepmind_atom.xml");
pub const HUGGINGFACE_RSS: &str = include_str!("../fixtures/huggingface_rss.xml");
pub const REDDIT_ML: &str = include_str!("../fixtures/reddit_machinelearning.json");
pub const REDDIT_LOCALLLAMA: &str = include_str!("../fixtures/reddit_localllama.json");
pub const ARXIV: &str = include_str!("../fixtures/arxiv.xml");

/// Start serving `router` and return its base URL, e.g. `http://127.0.0.1:53211`.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock upstream");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock upstream");
    });
    format!("http://{addr}")
}

/// Hacker News stories keyed by id. Ids listed in `topstories` but missing here
/// answer 404; `null_ids` answer JSON `null`.
#[derive(Clone, Default)]
pub struct HnFixture {
    pub topstories: Vec<u64>,
    pub items: HashMap<u64, Value>,
    pub null_ids: Vec<u64>,
}

impl HnFixture {
    /// Ranked ids 101..=106: a hot story, a null, an Ask HN without url, an off-topic
    /// story, a 404, and a cool story whose url duplicates an RSS entry.
    pub fn standard() -> Self {
        let mut items = HashMap::new();
        items.insert(101, story(101, "Claude 5 released", Some("https://news.example/claude-5"), 450));
        items.insert(103, story(103, "Ask HN: LLM tips for code review?", None, 90));
        items.insert(104, story(104, "Rust compiler internals", Some("https://rust.example/internals"), 700));
        items.insert(
            106,
            story(106, "OpenAI publishes GPT speedups", Some("https://openai.example/index/faster-gpt"), 120),
        );
        Self {
            topstories: vec![101, 102, 103, 104, 105, 106],
            items,
            null_ids: vec![102],
        }
    }
}

pub fn story(id: u64, title: &str, url: Option<&str>, score: i64) -> Value {
    let mut v = json!({
        "id": id,
        "by": "someone",
        "title": title,
        "time": 1769600000i64, // 2026-01-28
        "score": score,
        "type": "story"
    });
    if let Some(u) = url {
        v["url"] = json!(u);
    }
    v
}

pub fn hn_router(fx: HnFixture) -> Router {
    async fn top(State(fx): State<Arc<HnFixture>>) -> Json<Vec<u64>> {
        Json(fx.topstories.clone())
    }
    async fn item(State(fx): State<Arc<HnFixture>>, Path(file): Path<String>) -> Response {
        let id = file
            .strip_suffix(".json")
            .and_then(|s| s.parse::<u64>().ok());
        match id {
            Some(id) if fx.null_ids.contains(&id) => Json(Value::Null).into_response(),
            Some(id) => match fx.items.get(&id) {
                Some(v) => Json(v.clone()).into_response(),
                None => StatusCode::NOT_FOUND.into_response(),
            },
            None => StatusCode::BAD_REQUEST.into_response(),
        }
    }
    Router::new()
        .route("/v0/topstories.json", get(top))
        .route("/v0/item/{file}", get(item))
        .with_state(Arc::new(fx))
}

/// `/r/MachineLearning` and `/r/LocalLLaMA` answer fixtures; anything else is a 503.
pub fn reddit_router() -> Router {
    async fn hot(Path(sub): Path<String>, Query(q): Query<HashMap<String, String>>) -> Response {
        if q.get("limit").map(String::as_str) != Some("15") {
            return StatusCode::BAD_REQUEST.into_response();
        }
        let body = match sub.as_str() {
            "MachineLearning" => REDDIT_ML,
            "LocalLLaMA" => REDDIT_LOCALLLAMA,
            _ => return StatusCode::SERVICE_UNAVAILABLE.into_response(),
        };
        ([(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
    Router::new().route("/r/{sub}/hot.json", get(hot))
}

pub fn feeds_router() -> Router {
    fn xml(body: &'static str) -> Response {
        ([(header::CONTENT_TYPE, "application/rss+xml")], body).into_response()
    }
    Router::new()
        .route("/openai.xml", get(|| async { xml(OPENAI_RSS) }))
        .route("/deepmind.xml", get(|| async { xml(DEEPMIND_ATOM) }))
        .route("/huggingface.xml", get(|| async { xml(HUGGINGFACE_RSS) }))
        .route("/not-a-feed.xml", get(|| async { xml("<html><body>moved</body></html>") }))
        .route("/down.xml", get(|| async { StatusCode::BAD_GATEWAY }))
}

/// Answers the fixture only for a category query sorted newest first.
pub fn arxiv_router() -> Router {
    async fn query(Query(q): Query<HashMap<String, String>>) -> Response {
        let ok = q
            .get("search_query")
            .is_some_and(|s| s.contains("cat:cs.AI"))
            && q.get("sortBy").map(String::as_str) == Some("submittedDate")
            && q.get("sortOrder").map(String::as_str) == Some("descending");
        if !ok {
            return StatusCode::BAD_REQUEST.into_response();
        }
        ([(header::CONTENT_TYPE, "application/atom+xml")], ARXIV).into_response()
    }
    Router::new().route("/api/query", get(query))
}

/// Every upstream on one server.
pub fn all_upstreams(hn: HnFixture) -> Router {
    Router::new()
        .merge(hn_router(hn))
        .merge(reddit_router())
        .nest("/feeds", feeds_router())
        .merge(arxiv_router())
}

/// Config pointing every source at `base` (as served by `all_upstreams`).
pub fn config_for(base: &str) -> NewsConfig {
    let mut cfg = NewsConfig::default();
    cfg.http.timeout_secs = 5;
    cfg.server.provider_timeout_secs = 10;
    cfg.hackernews.base_url = format!("{base}/v0");
    cfg.reddit.base_url = base.to_string();
    cfg.reddit.subreddits = vec![
        "MachineLearning".to_string(),
        "LocalLLaMA".to_string(),
        "singularity".to_string(),
    ];
    cfg.rss.feeds = vec![
        FeedSpec::new("OpenAI Blog", &format!("{base}/feeds/openai.xml")),
        FeedSpec::new("DeepMind", &format!("{base}/feeds/deepmind.xml")),
        FeedSpec::new("Broken Feed", &format!("{base}/feeds/down.xml")),
        FeedSpec::new("Moved Feed", &format!("{base}/feeds/not-a-feed.xml")),
    ];
    cfg.arxiv.base_url = format!("{base}/api/query");
    cfg
}
