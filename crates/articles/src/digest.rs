//! Chat, notes, email and report payloads built from feed rows.

use std::fmt::Write as _;

use chrono::{DateTime, Local, NaiveDate, SecondsFormat};
use serde_json::{json, Value};

use crate::model::Article;

/// Slack rejects oversized block lists; longer feeds get a trailing summary.
pub const SLACK_ARTICLE_LIMIT: usize = 10;

/// The email preview only carries the head of the feed.
pub const EMAIL_ARTICLE_LIMIT: usize = 5;

const COLOR_BG: &str = "#151515";
const COLOR_PRIMARY: &str = "#DEEBC8";
const COLOR_ACCENT: &str = "#6C757D";
const COLOR_TEXT_BODY: &str = "#E0E0E0";

/// Block Kit message for the feed, headed by `day`.
pub fn slack_blocks(articles: &[Article], day: NaiveDate) -> Value {
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": format!("🚀 Scraperrr Intelligence Feed - {}", day.format("%Y-%m-%d")),
                "emoji": true,
            }
        }),
        json!({ "type": "divider" }),
    ];

    for article in articles.iter().take(SLACK_ARTICLE_LIMIT) {
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*{}*\n{} • <{}|Read Article>",
                    article.title, article.source, article.url
                ),
            }
        }));
        blocks.push(json!({ "type": "divider" }));
    }

    if articles.len() > SLACK_ARTICLE_LIMIT {
        blocks.push(json!({
            "type": "context",
            "elements": [{
                "type": "mrkdwn",
                "text": format!("And {} more articles...", articles.len() - SLACK_ARTICLE_LIMIT),
            }]
        }));
    }

    json!({ "blocks": blocks })
}

/// Page properties for a database with `Title`, `URL`, `Source` (select) and
/// `Date` columns.
pub fn notion_properties(article: &Article) -> Value {
    json!({
        "Title": { "title": [{ "text": { "content": article.title } }] },
        "URL": { "url": article.url },
        "Source": { "select": { "name": article.source } },
        "Date": {
            "date": {
                "start": article.scraped_at.to_rfc3339_opts(SecondsFormat::Secs, true)
            }
        },
    })
}

/// Escapes text for use in HTML element content and quoted attributes.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Inline-styled HTML email with the first [`EMAIL_ARTICLE_LIMIT`] articles.
pub fn email_html(articles: &[Article], year: i32) -> String {
    let mut rows = String::new();
    for article in articles.iter().take(EMAIL_ARTICLE_LIMIT) {
        let title = escape_html(&article.title);
        let source = escape_html(&article.source);
        let url = escape_html(&article.url);
        let _ = write!(
            rows,
            r#"
      <div style="background-color: rgba(255, 255, 255, 0.05); border: 1px solid #333; border-radius: 8px; padding: 16px; margin-bottom: 16px;">
        <div style="color: {COLOR_ACCENT}; font-size: 12px; text-transform: uppercase; letter-spacing: 1px; margin-bottom: 8px;">{source}</div>
        <h3 style="margin: 0 0 8px 0; font-family: 'Outfit', sans-serif; font-size: 18px; color: #ffffff;">
          <a href="{url}" style="color: #ffffff; text-decoration: none;">{title}</a>
        </h3>
        <a href="{url}" style="display: inline-block; color: {COLOR_PRIMARY}; text-decoration: none; font-size: 14px; font-weight: bold;">Read Article &rarr;</a>
      </div>"#
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Inter:wght@400;600&family=Outfit:wght@700&display=swap');
  </style>
</head>
<body style="margin: 0; padding: 0; background-color: {COLOR_BG}; font-family: 'Inter', sans-serif; color: {COLOR_TEXT_BODY};">
  <div style="max-width: 600px; margin: 0 auto; padding: 40px 20px;">
    <div style="text-align: center; margin-bottom: 40px;">
      <h1 style="font-family: 'Outfit', sans-serif; font-size: 32px; margin: 0; color: {COLOR_PRIMARY};">SCRAPER<span style="color: {COLOR_ACCENT};">RR</span></h1>
      <p style="color: {COLOR_ACCENT}; font-size: 14px; text-transform: uppercase; letter-spacing: 2px; margin-top: 8px;">Intelligence Feed</p>
    </div>
{rows}
    <div style="text-align: center; margin-top: 40px; padding-top: 20px; border-top: 1px solid #333; color: {COLOR_ACCENT}; font-size: 12px;">
      &copy; {year} Scraperrr. All rights reserved.
    </div>
  </div>
</body>
</html>
"#
    )
}

const REPORT_STYLE: &str = r#"
    body {
      background-color: var(--color-bg);
      color: var(--color-text);
      font-family: var(--font-body);
      margin: 0;
      padding: 0;
      -webkit-font-smoothing: antialiased;
    }
    .container { max-width: 1200px; margin: 0 auto; padding: 4rem 2rem; }
    .header {
      text-align: center;
      margin-bottom: 4rem;
      padding-bottom: 2rem;
      border-bottom: 1px solid rgba(255,255,255,0.1);
    }
    .logo {
      font-family: var(--font-heading);
      font-size: 4rem;
      font-weight: 700;
      color: var(--color-primary);
      margin: 0;
      line-height: 1;
    }
    .logo span { color: var(--color-accent); }
    .subtitle {
      color: var(--color-accent);
      font-size: 1.2rem;
      text-transform: uppercase;
      letter-spacing: 3px;
      margin-top: 1rem;
    }
    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(320px, 1fr));
      gap: 2rem;
    }
    .card {
      background: rgba(255, 255, 255, 0.03);
      border: 1px solid rgba(255, 255, 255, 0.05);
      border-radius: 12px;
      padding: 1.5rem;
      display: flex;
      flex-direction: column;
      transition: transform 0.2s ease, border-color 0.2s ease;
    }
    .card:hover { transform: translateY(-4px); border-color: var(--color-primary); }
    .source-tag {
      font-size: 0.75rem;
      color: var(--color-accent);
      text-transform: uppercase;
      letter-spacing: 1px;
      margin-bottom: 1rem;
    }
    .card-title {
      font-family: var(--font-heading);
      font-size: 1.5rem;
      color: #fff;
      margin: 0 0 1.5rem 0;
      line-height: 1.3;
    }
    .card-footer {
      margin-top: auto;
      display: flex;
      justify-content: space-between;
      align-items: center;
      border-top: 1px solid rgba(255,255,255,0.05);
      padding-top: 1rem;
    }
    .date { color: var(--color-accent); font-size: 0.875rem; }
    .read-more { color: var(--color-primary); text-decoration: none; font-weight: 600; transition: opacity 0.2s; }
    .read-more:hover { opacity: 0.8; }
    @media (max-width: 768px) {
      .container { padding: 2rem 1rem; }
      .logo { font-size: 3rem; }
    }
"#;

/// Standalone report page: every article as a card, dated in local time.
pub fn html_report(articles: &[Article], now: DateTime<Local>) -> String {
    let mut cards = String::new();
    for article in articles {
        let date = article.scraped_at.with_timezone(&Local).format("%b %d");
        let _ = write!(
            cards,
            r#"
      <div class="card">
        <span class="source-tag">{source}</span>
        <h3 class="card-title">{title}</h3>
        <div class="card-footer">
          <span class="date">{date}</span>
          <a href="{url}" target="_blank" class="read-more">Read &rarr;</a>
        </div>
      </div>"#,
            source = escape_html(&article.source),
            title = escape_html(&article.title),
            url = escape_html(&article.url),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Scraperrr Intelligence Report</title>
  <link rel="preconnect" href="https://fonts.googleapis.com">
  <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
  <link href="https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600&family=Outfit:wght@500;700&display=swap" rel="stylesheet">
  <style>
    :root {{
      --color-bg: {COLOR_BG};
      --color-primary: {COLOR_PRIMARY};
      --color-accent: {COLOR_ACCENT};
      --color-text: {COLOR_TEXT_BODY};
      --font-heading: 'Outfit', sans-serif;
      --font-body: 'Inter', sans-serif;
    }}
{REPORT_STYLE}  </style>
</head>
<body>
  <div class="container">
    <header class="header">
      <h1 class="logo">SCRAPER<span>RR</span></h1>
      <p class="subtitle">Weekly Intelligence Report</p>
      <p style="color: var(--color-accent); margin-top: 0.5rem;">Total Items: {total}</p>
    </header>
    <div class="grid">{cards}
    </div>
    <footer style="text-align: center; margin-top: 4rem; color: var(--color-accent); font-size: 0.875rem;">
      Generated by Scraperrr on {generated}
    </footer>
  </div>
</body>
</html>
"#,
        total = articles.len(),
        generated = now.format("%Y-%m-%d %H:%M:%S"),
    )
}
