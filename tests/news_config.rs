// tests/news_config.rs
use ai_news_aggregator::config::news::ENV_NEWS_CONFIG_PATH;
use ai_news_aggregator::config::{FeedSpec, NewsConfig};
use std::path::Path;
use std::{env, fs};

#[test]
fn shipped_config_matches_builtin_defaults() {
    let p = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/news.toml");
    let file = NewsConfig::load_from(&p).unwrap();
    let builtin = NewsConfig::default();

    assert_eq!(file.server.default_limit, builtin.server.default_limit);
    assert_eq!(file.server.cache_control(), builtin.server.cache_control());
    assert_eq!(file.hackernews.base_url, builtin.hackernews.base_url);
    assert_eq!(file.hackernews.hot_threshold, builtin.hackernews.hot_threshold);
    assert_eq!(file.reddit.subreddits, builtin.reddit.subreddits);
    assert_eq!(file.reddit.hot_threshold, builtin.reddit.hot_threshold);
    assert_eq!(file.rss.feeds, builtin.rss.feeds);
    assert_eq!(file.arxiv.enabled, builtin.arxiv.enabled);
    assert_eq!(file.arxiv.categories, builtin.arxiv.categories);
    assert_eq!(file.relevance.keywords, builtin.relevance.keywords);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(NewsConfig::load_from(&dir.path().join("nope.toml")).is_err());
}

#[test]
fn custom_keywords_replace_the_vocabulary() {
    let cfg = NewsConfig::from_toml_str(
        r#"
[relevance]
keywords = [" Robotics ", "robotics", ""]
"#,
    )
    .unwrap();
    let f = cfg.relevance.filter();
    assert_eq!(f.keywords(), &["robotics".to_string()]);
    assert!(f.is_relevant("Humanoid ROBOTICS update"));
    assert!(!f.is_relevant("New GPT model"));
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_NEWS_CONFIG_PATH);

    // 1) Nothing on disk → built-in defaults
    let cfg = NewsConfig::load_default().unwrap();
    assert_eq!(cfg.rss.feeds.len(), 6);

    // 2) ./config/news.toml
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(
        cfg_dir.join("news.toml"),
        r#"
[[rss.feeds]]
name = "Local"
url = "https://local.example/feed.xml"
"#,
    )
    .unwrap();
    let cfg = NewsConfig::load_default().unwrap();
    assert_eq!(
        cfg.rss.feeds,
        vec![FeedSpec::new("Local", "https://local.example/feed.xml")]
    );

    // 3) Env path wins
    let p_env = tmp.path().join("override.toml");
    fs::write(&p_env, "[server]\ndefault_limit = 7\n").unwrap();
    env::set_var(ENV_NEWS_CONFIG_PATH, p_env.display().to_string());
    let cfg = NewsConfig::load_default().unwrap();
    assert_eq!(cfg.server.default_limit, 7);
    assert_eq!(cfg.rss.feeds.len(), 6);

    // 4) Env path that does not exist is a hard error
    env::set_var(ENV_NEWS_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(NewsConfig::load_default().is_err());

    env::remove_var(ENV_NEWS_CONFIG_PATH);
    env::set_current_dir(&old).unwrap();
}
