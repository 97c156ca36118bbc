use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::error::FeedError;
use crate::model::{Article, ArticleId};

/// Placeholder artwork cycled across the rail; articles carry no images.
pub const STOCK_IMAGES: [&str; 6] = [
    "https://images.unsplash.com/photo-1620712943543-bcc4688e7485?q=80&w=1000&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1677442136019-21780ecad995?q=80&w=1000&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1555255707-c07966088b7b?q=80&w=1000&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1518770660439-4636190af475?q=80&w=1000&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1550751827-4bd374c3f58b?q=80&w=1000&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1593508512255-86ab42a8e620?q=80&w=1000&auto=format&fit=crop",
];

/// Non-empty, fixed set of placeholder images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSet(Vec<String>);

impl ImageSet {
    /// Returns `None` for an empty list.
    pub fn new(images: Vec<String>) -> Option<Self> {
        if images.is_empty() {
            None
        } else {
            Some(Self(images))
        }
    }

    pub fn stock() -> Self {
        Self(STOCK_IMAGES.iter().map(|url| url.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Image for rail position `index`, cycling through the set.
    pub fn for_index(&self, index: usize) -> &str {
        &self.0[index % self.0.len()]
    }
}

impl Default for ImageSet {
    fn default() -> Self {
        Self::stock()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateZone {
    #[default]
    Local,
    Utc,
}

/// How capture timestamps are rendered in item descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateStyle {
    format: String,
    zone: DateZone,
}

impl DateStyle {
    /// Short US-style date (`5/1/2024`).
    pub const DEFAULT_FORMAT: &'static str = "%-m/%-d/%Y";

    pub fn new(format: impl Into<String>, zone: DateZone) -> Result<Self, FeedError> {
        let format = format.into();
        if format.trim().is_empty() {
            return Err(FeedError::Config("date format must not be empty".into()));
        }
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(FeedError::Config(format!("invalid date format '{format}'")));
        }
        Ok(Self { format, zone })
    }

    pub fn format(&self, timestamp: &DateTime<Utc>) -> String {
        match self.zone {
            DateZone::Local => timestamp
                .with_timezone(&Local)
                .format(&self.format)
                .to_string(),
            DateZone::Utc => timestamp.format(&self.format).to_string(),
        }
    }
}

impl Default for DateStyle {
    fn default() -> Self {
        Self {
            format: Self::DEFAULT_FORMAT.to_string(),
            zone: DateZone::Local,
        }
    }
}

/// UI-ready projection of an [`Article`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    pub id: ArticleId,
    pub title: String,
    pub description: String,
    pub meta: String,
    pub image_src: String,
    pub href: String,
}

pub fn describe(source: &str, date: &str) -> String {
    format!("{source} • {date}")
}

/// Maps rows to rail items, preserving order.
pub fn map_articles(articles: &[Article], images: &ImageSet, dates: &DateStyle) -> Vec<DisplayItem> {
    articles
        .iter()
        .enumerate()
        .map(|(index, article)| DisplayItem {
            id: article.id.clone(),
            title: article.title.clone(),
            description: describe(&article.source, &dates.format(&article.scraped_at)),
            meta: article.source.clone(),
            image_src: images.for_index(index).to_string(),
            href: article.url.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(id: usize, source: &str) -> Article {
        Article {
            id: ArticleId::new(id.to_string()),
            title: format!("Article {id}"),
            url: format!("https://news.example/{id}"),
            source: source.to_string(),
            scraped_at: Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap(),
        }
    }

    fn utc_style() -> DateStyle {
        DateStyle::new(DateStyle::DEFAULT_FORMAT, DateZone::Utc).unwrap()
    }

    #[test]
    fn maps_every_row_in_order() {
        for count in [0usize, 1, 7, 20] {
            let rows: Vec<Article> = (0..count).map(|i| article(i, "BensBites")).collect();
            let items = map_articles(&rows, &ImageSet::stock(), &utc_style());
            assert_eq!(items.len(), count);
            for (item, row) in items.iter().zip(&rows) {
                assert_eq!(item.id, row.id);
                assert_eq!(item.href, row.url);
                assert_eq!(item.title, row.title);
            }
        }
    }

    #[test]
    fn images_cycle_by_index() {
        let rows: Vec<Article> = (0..14).map(|i| article(i, "TheRundown")).collect();
        let images = ImageSet::stock();
        let items = map_articles(&rows, &images, &utc_style());
        for (index, item) in items.iter().enumerate() {
            assert_eq!(item.image_src, STOCK_IMAGES[index % STOCK_IMAGES.len()]);
        }
        assert_eq!(items[6].image_src, items[0].image_src);
    }

    #[test]
    fn custom_image_set_cycles_too() {
        let images = ImageSet::new(vec!["a.png".into(), "b.png".into()]).unwrap();
        assert_eq!(images.for_index(0), "a.png");
        assert_eq!(images.for_index(3), "b.png");
        assert!(ImageSet::new(Vec::new()).is_none());
    }

    #[test]
    fn description_combines_source_and_date() {
        let items = map_articles(&[article(1, "BensBites")], &ImageSet::stock(), &utc_style());
        assert_eq!(items[0].description, "BensBites • 3/9/2024");
        assert_eq!(items[0].meta, "BensBites");
    }

    #[test]
    fn rejects_invalid_date_formats() {
        assert!(DateStyle::new("%Q", DateZone::Utc).is_err());
        assert!(DateStyle::new("", DateZone::Local).is_err());
        assert!(DateStyle::new("%Y-%m-%d", DateZone::Local).is_ok());
    }
}
