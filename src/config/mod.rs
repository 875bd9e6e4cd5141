pub mod news;

pub use news::{FeedSpec, NewsConfig};
