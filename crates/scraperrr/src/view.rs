use std::time::Instant;

use articles::{Article, ArticleSource, DisplayItem, FeedError, FeedState, FeedView};
use gradient::SurfaceSignal;

use crate::present::{self, BRAND};
use crate::rail::FocusRail;
use crate::settings::Settings;

/// What the event loop should do after a surface signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    Nothing,
    FocusChanged,
    Activated(String),
    Exit,
}

/// The page: feed view model plus the focus rail over its items.
pub struct RootView {
    feed: FeedView,
    rail: FocusRail,
    year: i32,
}

impl RootView {
    pub fn new(settings: &Settings, year: i32, now: Instant) -> Self {
        Self {
            feed: FeedView::new(settings.images.clone(), settings.dates.clone()),
            rail: FocusRail::new_at(settings.rail, now),
            year,
        }
    }

    pub fn state(&self) -> FeedState<'_> {
        self.feed.state()
    }

    /// Synchronous fetch, used when there is no surface to keep responsive.
    pub fn fetch(&mut self, source: &dyn ArticleSource, now: Instant) {
        self.feed.fetch_articles(source);
        self.rail.reset(self.feed.items().len(), now);
    }

    pub fn apply_feed(&mut self, result: Result<Vec<Article>, FeedError>, now: Instant) {
        self.feed.apply(result);
        self.rail.reset(self.feed.items().len(), now);
    }

    pub fn focused_item(&self) -> Option<&DisplayItem> {
        self.rail
            .focused()
            .and_then(|index| self.feed.items().get(index))
    }

    pub fn handle_signal(&mut self, signal: SurfaceSignal, now: Instant) -> Reaction {
        match signal {
            SurfaceSignal::FocusPrevious if self.rail.previous(now) => Reaction::FocusChanged,
            SurfaceSignal::FocusNext if self.rail.next(now) => Reaction::FocusChanged,
            SurfaceSignal::FocusPrevious | SurfaceSignal::FocusNext => Reaction::Nothing,
            SurfaceSignal::Activate => self
                .focused_item()
                .map(|item| Reaction::Activated(item.href.clone()))
                .unwrap_or(Reaction::Nothing),
            SurfaceSignal::Closed => Reaction::Exit,
        }
    }

    pub fn autoplay_deadline(&self) -> Option<Instant> {
        self.rail.autoplay_deadline()
    }

    /// Advances autoplay; true when focus moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.rail.tick(now)
    }

    pub fn title(&self) -> String {
        self.focused_item()
            .map(present::window_title)
            .unwrap_or_else(|| BRAND.to_string())
    }

    pub fn focus_line(&self) -> Option<String> {
        let index = self.rail.focused()?;
        let item = self.feed.items().get(index)?;
        Some(present::focus_line(item, index, self.rail.len()))
    }

    pub fn page(&self) -> String {
        present::render_page(self.feed.state(), self.rail.focused(), self.year)
    }
}
