use std::collections::HashSet;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::FeedError;
use crate::model::Article;

/// Most rows the feed ever keeps client-side.
pub const ARTICLE_LIMIT: usize = 20;
pub const DEFAULT_TABLE: &str = "articles";

/// Where the article table lives and how to authenticate against it.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    pub anon_key: String,
    pub table: String,
}

impl BackendConfig {
    pub fn new(base_url: &str, anon_key: impl Into<String>) -> Result<Self, FeedError> {
        let anon_key = anon_key.into();
        if anon_key.trim().is_empty() {
            return Err(FeedError::Config("backend API key must not be empty".into()));
        }
        let base_url = Url::parse(base_url.trim())
            .map_err(|err| FeedError::Config(format!("invalid backend url '{base_url}': {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FeedError::Config(format!(
                "backend url '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            base_url,
            anon_key,
            table: DEFAULT_TABLE.to_string(),
        })
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// `{base}/rest/v1/{table}?select=*&order=scraped_at.desc&limit={limit}`
    pub fn query_url(&self, limit: usize) -> Result<Url, FeedError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FeedError::Config("invalid backend base url".into()))?;
            segments.pop_if_empty();
            segments.push("rest");
            segments.push("v1");
            segments.push(&self.table);
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("select", "*")
            .append_pair("order", "scraped_at.desc")
            .append_pair("limit", &limit.min(ARTICLE_LIMIT).to_string());
        Ok(url)
    }
}

/// Anything that can produce the most recent article rows.
pub trait ArticleSource {
    /// Returns at most `limit` rows, newest capture timestamp first.
    fn fetch_recent(&self, limit: usize) -> Result<Vec<Article>, FeedError>;
}

/// PostgREST reader for the article table.
#[derive(Debug, Clone)]
pub struct ArticleClient {
    http: Client,
    config: BackendConfig,
}

impl ArticleClient {
    pub fn new(config: BackendConfig) -> Result<Self, FeedError> {
        let http = Client::builder()
            .user_agent(concat!("scraperrr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FeedError::Client)?;
        Ok(Self { http, config })
    }
}

impl ArticleSource for ArticleClient {
    fn fetch_recent(&self, limit: usize) -> Result<Vec<Article>, FeedError> {
        let url = self.config.query_url(limit)?;
        debug!(%url, "querying article table");
        let response = self
            .http
            .get(url.clone())
            .header("apikey", &self.config.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.anon_key))
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|source| FeedError::Transport {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        let body = response.text().map_err(|source| FeedError::Transport {
            url: url.to_string(),
            source,
        })?;
        if !status.is_success() {
            return Err(decode_error(status.as_u16(), &body));
        }
        let rows = decode_rows(&body)?;
        Ok(retain_feed_rows(rows, limit))
    }
}

impl<T: ArticleSource + ?Sized> ArticleSource for &T {
    fn fetch_recent(&self, limit: usize) -> Result<Vec<Article>, FeedError> {
        (**self).fetch_recent(limit)
    }
}

impl<T: ArticleSource + ?Sized> ArticleSource for Box<T> {
    fn fetch_recent(&self, limit: usize) -> Result<Vec<Article>, FeedError> {
        (**self).fetch_recent(limit)
    }
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    message: String,
    #[serde(default)]
    hint: Option<String>,
}

pub(crate) fn decode_rows(body: &str) -> Result<Vec<Article>, FeedError> {
    Ok(serde_json::from_str(body)?)
}

pub(crate) fn decode_error(status: u16, body: &str) -> FeedError {
    if let Ok(err) = serde_json::from_str::<PostgrestError>(body) {
        let message = match err.hint {
            Some(hint) if !hint.is_empty() => format!("{} (hint: {hint})", err.message),
            _ => err.message,
        };
        return FeedError::Backend {
            code: err.code.unwrap_or_else(|| status.to_string()),
            message,
        };
    }
    FeedError::Status {
        status,
        message: body.chars().take(200).collect(),
    }
}

/// Caps rows at `limit` and drops repeated ids, keeping the server's order.
pub(crate) fn retain_feed_rows(rows: Vec<Article>, limit: usize) -> Vec<Article> {
    let limit = limit.min(ARTICLE_LIMIT);
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(rows.len().min(limit));
    for row in rows {
        if kept.len() == limit {
            break;
        }
        if !seen.insert(row.id.clone()) {
            warn!(id = %row.id, "dropping duplicate article row");
            continue;
        }
        kept.push(row);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArticleId;
    use chrono::{TimeZone, Utc};

    fn row(id: &str) -> Article {
        Article {
            id: ArticleId::new(id),
            title: format!("title {id}"),
            url: format!("https://example.com/{id}"),
            source: "BensBites".into(),
            scraped_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn builds_postgrest_query() {
        let config = BackendConfig::new("https://demo.supabase.co", "anon").unwrap();
        let url = config.query_url(ARTICLE_LIMIT).unwrap();
        assert_eq!(
            url.as_str(),
            "https://demo.supabase.co/rest/v1/articles?select=*&order=scraped_at.desc&limit=20"
        );
    }

    #[test]
    fn query_respects_trailing_slash_and_custom_table() {
        let config = BackendConfig::new("https://demo.supabase.co/", "anon")
            .unwrap()
            .with_table("news");
        let url = config.query_url(5).unwrap();
        assert_eq!(url.path(), "/rest/v1/news");
        assert_eq!(url.query(), Some("select=*&order=scraped_at.desc&limit=5"));
    }

    #[test]
    fn query_limit_never_exceeds_cap() {
        let config = BackendConfig::new("https://demo.supabase.co", "anon").unwrap();
        let url = config.query_url(500).unwrap();
        assert!(url.query().unwrap().ends_with("limit=20"));
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(
            BackendConfig::new("https://demo.supabase.co", "  "),
            Err(FeedError::Config(_))
        ));
        assert!(matches!(
            BackendConfig::new("not a url", "anon"),
            Err(FeedError::Config(_))
        ));
        assert!(matches!(
            BackendConfig::new("mailto:someone@example.com", "anon"),
            Err(FeedError::Config(_))
        ));
    }

    #[test]
    fn decodes_postgrest_error_body() {
        let err = decode_error(
            404,
            r#"{"code":"42P01","details":null,"hint":null,"message":"relation \"public.articles\" does not exist"}"#,
        );
        match err {
            FeedError::Backend { code, message } => {
                assert_eq!(code, "42P01");
                assert!(message.contains("does not exist"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn falls_back_to_status_error() {
        let err = decode_error(502, "<html>bad gateway</html>");
        assert!(matches!(err, FeedError::Status { status: 502, .. }));
    }

    #[test]
    fn decode_rows_reports_malformed_payloads() {
        assert!(matches!(decode_rows("{\"oops\":1}"), Err(FeedError::Decode(_))));
        assert!(decode_rows("[]").unwrap().is_empty());
    }

    #[test]
    fn retain_caps_and_dedupes_in_order() {
        let mut rows: Vec<Article> = (0..25).map(|i| row(&i.to_string())).collect();
        rows.insert(1, row("0"));
        let kept = retain_feed_rows(rows, ARTICLE_LIMIT);
        assert_eq!(kept.len(), ARTICLE_LIMIT);
        let ids: Vec<&str> = kept.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids[..3], ["0", "1", "2"]);
        assert_eq!(ids[19], "19");
    }
}
