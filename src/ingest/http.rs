// src/ingest/http.rs
use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::news::HttpConfig;

/// Shared upstream client. Every request is bounded by `timeout_secs`.
pub fn build_client(cfg: &HttpConfig) -> Result<Client> {
    Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .context("building upstream http client")
}

/// GET and return the body as text; non-2xx is an error.
pub async fn get_text(client: &Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url} status"))?;
    resp.text().await.with_context(|| format!("GET {url} .text()"))
}

/// GET and decode a JSON body; non-2xx is an error.
pub async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url} status"))?;
    resp.json::<T>()
        .await
        .with_context(|| format!("GET {url} .json()"))
}
