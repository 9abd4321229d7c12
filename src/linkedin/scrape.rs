//! Page scraping adapter
//!
//! All of the brittle pattern matching against LinkedIn's current markup
//! lives here, behind [`PageScraper`], so the rest of the pipeline never
//! touches raw HTML. The patterns target one platform's current CDN naming
//! and login form; expect them to need updating when the site changes.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use scraper::{Html, Selector};

/// Live CDN manifest URL as embedded in an event/post page
static LIVE_MANIFEST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https://(?:\w+-)?livectorprodmedia\d+-\w+\.licdn\.com/[a-zA-Z0-9-]+/[a-zA-Z0-9-]+-livemanifest\.ism/manifest\(format=m3u8-aapl(?:-v3)?\)",
    )
    .unwrap()
});

static FORM_ACTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<form[^>]+action=(?:"([^"]*)"|'([^']*)')"#).unwrap());

static ERROR_SPAN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<span[^>]+class="error"[^>]*>\s*(.+?)\s*</span>"#).unwrap());

static LIKE_COUNT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""numLikes"\s*:\s*(\d+)"#).unwrap());

/// Optional metadata scraped off the main page for the richer record fields
#[derive(Debug, Default)]
pub struct PageMetadata {
    pub description: Option<String>,
    pub uploader: Option<String>,
    pub thumbnail: Option<String>,
    pub like_count: Option<u64>,
}

/// Everything the extraction pipeline needs out of a fetched page.
///
/// Implementations are pure string-in / value-out so they can be exercised
/// against fixture HTML without any network.
pub trait PageScraper {
    /// Finds the embedded live manifest URL, normalized to the `-v3` format
    /// parameter variant
    ///
    /// # Errors
    /// Errors when the page contains no matching manifest URL
    fn locate_manifest(&self, html: &str) -> Result<String>;

    /// The login form's `action` target, if the page carries one
    fn form_action(&self, html: &str) -> Option<String>;

    /// All hidden `<input>` fields of the page as (name, value) pairs
    fn hidden_inputs(&self, html: &str) -> Vec<(String, String)>;

    /// The site's own error message, when an `error`-classed span is present
    fn error_message(&self, html: &str) -> Option<String>;

    /// The document `<title>` text, if present and non-empty
    fn page_title(&self, html: &str) -> Option<String>;

    /// Best-effort optional metadata (`og:` tags and embedded counters)
    fn page_metadata(&self, html: &str) -> PageMetadata;
}

/// Production scraper targeting LinkedIn's current markup
#[derive(Debug, Clone, Copy)]
pub struct LivePageScraper;

impl PageScraper for LivePageScraper {
    fn locate_manifest(&self, html: &str) -> Result<String> {
        let page = unescape_entities(html);
        let found = LIVE_MANIFEST_REGEX
            .find(&page)
            .context("No live manifest URL found in page")?;

        // Older pages embed the plain `aapl` parameter; the CDN serves the
        // usable playlist only under `aapl-v3`
        Ok(found.as_str().replace("aapl)", "aapl-v3)"))
    }

    fn form_action(&self, html: &str) -> Option<String> {
        let captures = FORM_ACTION_REGEX.captures(html)?;
        let action = captures.get(1).or_else(|| captures.get(2))?;
        Some(action.as_str().to_string())
    }

    fn hidden_inputs(&self, html: &str) -> Vec<(String, String)> {
        let document = Html::parse_document(html);
        let Ok(selector) = Selector::parse(r#"input[type="hidden"]"#) else {
            return Vec::new();
        };

        document
            .select(&selector)
            .filter_map(|element| {
                let name = element.value().attr("name")?;
                let value = element.value().attr("value").unwrap_or_default();
                Some((name.to_string(), value.to_string()))
            })
            .collect()
    }

    fn error_message(&self, html: &str) -> Option<String> {
        let captures = ERROR_SPAN_REGEX.captures(html)?;
        Some(captures[1].to_string())
    }

    fn page_title(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("title").ok()?;
        let element = document.select(&selector).next()?;

        let text = element.text().collect::<String>();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    fn page_metadata(&self, html: &str) -> PageMetadata {
        let document = Html::parse_document(html);

        PageMetadata {
            description: meta_content(&document, r#"meta[property="og:description"]"#),
            uploader: meta_content(&document, r#"meta[name="author"]"#),
            thumbnail: meta_content(&document, r#"meta[property="og:image"]"#),
            like_count: LIKE_COUNT_REGEX
                .captures(html)
                .and_then(|captures| captures[1].parse().ok()),
        }
    }
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let content = document.select(&selector).next()?.value().attr("content")?;

    let content = content.trim();
    (!content.is_empty()).then(|| content.to_string())
}

/// Decodes the HTML entities the page actually emits around embedded URLs
#[must_use]
pub fn unescape_entities(html: &str) -> String {
    html.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}
