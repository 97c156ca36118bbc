/// Everything that can go wrong while reading the article table.
///
/// The root view treats every variant the same way ("fetch failed"): log and
/// show the empty state.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("invalid backend configuration: {0}")]
    Config(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("backend responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("backend error {code}: {message}")]
    Backend { code: String, message: String },
    #[error("failed to decode article rows: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to start feed worker: {0}")]
    Worker(#[from] std::io::Error),
    #[error("feed worker stopped before delivering a result")]
    Disconnected,
}
