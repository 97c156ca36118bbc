mod client;
mod digest;
mod display;
mod error;
mod feed;
mod loader;
mod model;

pub use client::{ArticleClient, ArticleSource, BackendConfig, ARTICLE_LIMIT, DEFAULT_TABLE};
pub use digest::{
    email_html, html_report, notion_properties, slack_blocks, EMAIL_ARTICLE_LIMIT,
    SLACK_ARTICLE_LIMIT,
};
pub use display::{describe, map_articles, DateStyle, DateZone, DisplayItem, ImageSet, STOCK_IMAGES};
pub use error::FeedError;
pub use feed::{FeedState, FeedView, EMPTY_MESSAGE, LOADING_MESSAGE};
pub use loader::{FeedLoad, FeedLoader};
pub use model::{Article, ArticleId};
