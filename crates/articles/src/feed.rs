use tracing::{error, info};

use crate::client::{ArticleSource, ARTICLE_LIMIT};
use crate::display::{map_articles, DateStyle, DisplayItem, ImageSet};
use crate::error::FeedError;
use crate::model::Article;

pub const LOADING_MESSAGE: &str = "Initializing Feed...";
pub const EMPTY_MESSAGE: &str = "No articles found. Run the scraper!";

/// What the feed area should currently show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState<'a> {
    Loading,
    Empty,
    Ready(&'a [DisplayItem]),
}

/// View model behind the article rail.
///
/// Starts out loading; the first completed fetch (success or failure) clears
/// the flag for good.
#[derive(Debug, Clone)]
pub struct FeedView {
    items: Vec<DisplayItem>,
    loading: bool,
    last_error: Option<String>,
    images: ImageSet,
    dates: DateStyle,
}

impl FeedView {
    pub fn new(images: ImageSet, dates: DateStyle) -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            last_error: None,
            images,
            dates,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn state(&self) -> FeedState<'_> {
        if self.loading {
            FeedState::Loading
        } else if self.items.is_empty() {
            FeedState::Empty
        } else {
            FeedState::Ready(&self.items)
        }
    }

    /// Runs the query on the current thread and folds the result in.
    pub fn fetch_articles(&mut self, source: &dyn ArticleSource) {
        let result = source.fetch_recent(ARTICLE_LIMIT);
        self.apply(result);
    }

    /// Folds a completed fetch into the view. Failures are logged and leave
    /// the list empty.
    pub fn apply(&mut self, result: Result<Vec<Article>, FeedError>) {
        match result {
            Ok(articles) => {
                self.items = map_articles(&articles, &self.images, &self.dates);
                self.last_error = None;
                info!(count = self.items.len(), "article feed loaded");
            }
            Err(err) => {
                error!(error = %err, "error fetching articles");
                self.items.clear();
                self.last_error = Some(err.to_string());
            }
        }
        self.loading = false;
    }
}

impl Default for FeedView {
    fn default() -> Self {
        Self::new(ImageSet::default(), DateStyle::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArticleId;
    use chrono::{TimeZone, Utc};
    use std::cell::Cell;

    struct StaticSource {
        rows: Vec<Article>,
        calls: Cell<usize>,
        requested: Cell<usize>,
    }

    impl ArticleSource for StaticSource {
        fn fetch_recent(&self, limit: usize) -> Result<Vec<Article>, FeedError> {
            self.calls.set(self.calls.get() + 1);
            self.requested.set(limit);
            Ok(self.rows.clone())
        }
    }

    struct FailingSource;

    impl ArticleSource for FailingSource {
        fn fetch_recent(&self, _limit: usize) -> Result<Vec<Article>, FeedError> {
            Err(FeedError::Status {
                status: 503,
                message: "service unavailable".into(),
            })
        }
    }

    fn rows(count: usize) -> Vec<Article> {
        (0..count)
            .map(|i| Article {
                id: ArticleId::new(format!("id-{i}")),
                title: format!("Story {i}"),
                url: format!("https://example.com/{i}"),
                source: "TheRundown".into(),
                scraped_at: Utc.with_ymd_and_hms(2024, 1, 20 - i as u32 % 19, 8, 0, 0).unwrap(),
            })
            .collect()
    }

    #[test]
    fn starts_loading() {
        let view = FeedView::default();
        assert!(view.is_loading());
        assert_eq!(view.state(), FeedState::Loading);
    }

    #[test]
    fn successful_fetch_shows_items_in_query_order() {
        let source = StaticSource {
            rows: rows(12),
            calls: Cell::new(0),
            requested: Cell::new(0),
        };
        let mut view = FeedView::default();
        view.fetch_articles(&source);

        assert_eq!(source.calls.get(), 1);
        assert_eq!(source.requested.get(), ARTICLE_LIMIT);
        assert!(!view.is_loading());
        let FeedState::Ready(items) = view.state() else {
            panic!("expected ready feed");
        };
        assert_eq!(items.len(), 12);
        let titles: Vec<&str> = items.iter().map(|item| item.title.as_str()).collect();
        let expected: Vec<String> = (0..12).map(|i| format!("Story {i}")).collect();
        assert_eq!(titles, expected);
    }

    #[test]
    fn empty_result_shows_empty_state() {
        let source = StaticSource {
            rows: Vec::new(),
            calls: Cell::new(0),
            requested: Cell::new(0),
        };
        let mut view = FeedView::default();
        view.fetch_articles(&source);
        assert_eq!(view.state(), FeedState::Empty);
        assert!(view.last_error().is_none());
    }

    #[test]
    fn failure_shows_empty_state_and_records_error() {
        let mut view = FeedView::default();
        view.fetch_articles(&FailingSource);
        assert!(!view.is_loading());
        assert_eq!(view.state(), FeedState::Empty);
        assert!(view.last_error().unwrap().contains("503"));
    }

    #[test]
    fn failure_after_success_clears_items() {
        let mut view = FeedView::default();
        view.apply(Ok(rows(3)));
        assert_eq!(view.items().len(), 3);
        view.apply(Err(FeedError::Disconnected));
        assert_eq!(view.state(), FeedState::Empty);
    }
}
