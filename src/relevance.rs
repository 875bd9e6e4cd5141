// src/relevance.rs
//! Topical relevance gate shared by every provider.
//!
//! A record is in scope when at least one vocabulary term occurs, case-insensitively,
//! as a substring of any of its text fields (title, body, abstract). Matching is plain
//! substring containment on purpose: `"ai"` also matches inside `"openai"` and `"said"`,
//! which is how every source has always been filtered.

use std::collections::BTreeSet;
use tracing::debug;

/// Built-in AI/ML vocabulary.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "ai",
    "artificial intelligence",
    "machine learning",
    "ml",
    "llm",
    "gpt",
    "claude",
    "anthropic",
    "openai",
    "chatgpt",
    "gemini",
    "llama",
    "mistral",
    "transformer",
    "neural",
    "deep learning",
    "nlp",
    "computer vision",
    "diffusion",
    "stable diffusion",
    "midjourney",
    "generative",
    "agi",
    "copilot",
    "hugging face",
    "pytorch",
    "tensorflow",
    "langchain",
    "vector",
    "embedding",
    "rag",
    "fine-tune",
    "prompt",
    "agent",
];

pub const ENV_RELEVANCE_DEV_LOG: &str = "RELEVANCE_DEV_LOG";

// Dev logging gate: RELEVANCE_DEV_LOG=1 AND a debug build.
pub(crate) fn dev_logging_enabled() -> bool {
    cfg!(debug_assertions)
        && std::env::var(ENV_RELEVANCE_DEV_LOG).ok().as_deref() == Some("1")
}

/// Short, stable fingerprint for log lines and ids (first 6 bytes of SHA-256, hex).
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied())
    }
}

impl RelevanceFilter {
    /// Build from an arbitrary vocabulary. Terms are trimmed, lower-cased and deduplicated;
    /// blanks are dropped. An empty vocabulary matches nothing.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for k in keywords {
            let t = k.as_ref().trim().to_lowercase();
            if !t.is_empty() && seen.insert(t.clone()) {
                out.push(t);
            }
        }
        Self { keywords: out }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_relevant(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// True if any of the given fields is relevant.
    pub fn is_relevant_any(&self, fields: &[&str]) -> bool {
        let hit = fields.iter().any(|f| self.is_relevant(f));
        if !hit && dev_logging_enabled() {
            let joined = fields.join(" ");
            debug!(target: "relevance", id = %anon_hash(&joined), "dropped as off-topic");
        }
        hit
    }
}
