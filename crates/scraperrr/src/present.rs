//! Plain-text rendering of the root view.

use std::fmt::Write as _;

use articles::{DisplayItem, FeedState, EMPTY_MESSAGE, LOADING_MESSAGE};

pub const BRAND: &str = "SCRAPERRR";
pub const TAGLINE: &str = "Daily Intelligence Feed";

pub fn footer(year: i32) -> String {
    format!("© {year} Scraperrr Systems.")
}

/// Window caption for the focused item.
pub fn window_title(item: &DisplayItem) -> String {
    format!("{} — {}", item.title, item.description)
}

/// One-line status used while the rail is being browsed.
pub fn focus_line(item: &DisplayItem, index: usize, total: usize) -> String {
    format!("[{}/{}] {}", index + 1, total, window_title(item))
}

/// Full page: header, feed body, footer.
pub fn render_page(state: FeedState<'_>, focused: Option<usize>, year: i32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{BRAND}");
    let _ = writeln!(out, "{TAGLINE}");
    out.push('\n');

    match state {
        FeedState::Loading => {
            let _ = writeln!(out, "{LOADING_MESSAGE}");
        }
        FeedState::Empty => {
            let _ = writeln!(out, "{EMPTY_MESSAGE}");
        }
        FeedState::Ready(items) => {
            for (index, item) in items.iter().enumerate() {
                let marker = if focused == Some(index) { '>' } else { ' ' };
                let _ = writeln!(out, "{marker} {:>2}. {}", index + 1, item.title);
                let _ = writeln!(out, "      {}", item.description);
                let _ = writeln!(out, "      {}", item.href);
                let _ = writeln!(out, "      image: {}", item.image_src);
            }
        }
    }

    out.push('\n');
    let _ = writeln!(out, "{}", footer(year));
    out
}
