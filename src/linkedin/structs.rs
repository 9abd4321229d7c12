use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};

static EVENT_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://www\.linkedin\.com/events/(\d+)/comments/").unwrap());

static POST_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?linkedin\.com/posts/[^/?#]+-(\d+)-\w{4}/?(?:[?#]|$)").unwrap()
});

/// Which URL shape an input matched. Both kinds share the same manifest
/// resolution; the kind only decides where the id comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Event,
    Post,
}

impl MediaKind {
    /// Classifies a user-supplied URL and captures the media id out of it
    ///
    /// # Errors
    /// Errors when the URL matches neither the event nor the post shape
    pub fn classify(url: &str) -> Result<(Self, String)> {
        if let Some(captures) = EVENT_URL_REGEX.captures(url) {
            return Ok((Self::Event, captures[1].to_string()));
        }

        if let Some(captures) = POST_URL_REGEX.captures(url) {
            return Ok((Self::Post, captures[1].to_string()));
        }

        bail!("Unrecognized LinkedIn event / post URL: {url}");
    }
}

/// A single downloadable stream variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Format {
    pub url: String,
    pub ext: String,
    /// Total bitrate in kbit/s
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tbr: Option<u64>,
}

/// The metadata record handed to the caller. Absent optional fields are
/// omitted from the serialized output rather than emitted as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    pub formats: Vec<Format>,
}
