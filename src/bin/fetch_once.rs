//! Runs one aggregation against the live sources and prints it as JSON.
//! Usage: `cargo run --bin fetch_once -- [limit]`

use ai_news_aggregator::{init_tracing, Aggregator, NewsConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let limit = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0);

    let cfg = NewsConfig::load_default()?;
    let aggregator = Aggregator::from_config(&cfg)?;
    let result = aggregator
        .aggregate(limit.unwrap_or(cfg.server.default_limit))
        .await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
