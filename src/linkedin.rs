use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::credentials::Credentials;
use crate::linkedin::auth::Session;
use crate::linkedin::scrape::PageScraper;
use crate::linkedin::structs::{MediaKind, MediaRecord};
use crate::util::BROWSER_USER_AGENT;

pub mod auth;
pub mod manifest;
pub mod scrape;
pub mod structs;

/// Runs the whole extraction pipeline for one event / post URL
///
/// # Errors
/// Errors on unrecognized URLs, login rejection, network failure, or a page
/// without a live manifest. Format and title resolution failures are
/// non-fatal per contract.
#[instrument(skip(session, scraper, credentials))]
pub async fn extract(
    session: &mut Session,
    scraper: &dyn PageScraper,
    credentials: Option<&Credentials>,
    url: &str,
) -> Result<MediaRecord> {
    let (kind, id) = MediaKind::classify(url)?;
    info!("Extracting LinkedIn {kind:?} {id}");

    if let Some(credentials) = credentials {
        session.login(scraper, credentials).await?;
    }

    let page = fetch_page(session.client(), url).await?;
    debug!("Fetched page ({} bytes)", page.len());

    let manifest_url = scraper.locate_manifest(&page)?;
    debug!("Live manifest: {manifest_url}");

    let playlist_url = manifest::derive_playlist_url(session.client(), &manifest_url).await?;
    let formats = manifest::resolve_formats(session.client(), &playlist_url).await;
    info!("Resolved {} stream variants", formats.len());

    let title = find_title(session.client(), scraper, url).await;
    let meta = scraper.page_metadata(&page);

    Ok(MediaRecord {
        id,
        title,
        description: meta.description,
        uploader: meta.uploader,
        thumbnail: meta.thumbnail,
        like_count: meta.like_count,
        formats,
    })
}

#[instrument(skip(client))]
async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
    client
        .get(url)
        .send()
        .await
        .context("Fetching event / post page")?
        .text()
        .await
        .context("Decoding event / post page")
}

/// Re-fetches the page under a desktop browser identity and pulls the
/// document title out of it. Any failure, including a non-200 status, yields
/// `None` rather than an error.
#[instrument(skip(client, scraper))]
pub async fn find_title(
    client: &reqwest::Client,
    scraper: &dyn PageScraper,
    url: &str,
) -> Option<String> {
    let req = client
        .get(url)
        .header("User-Agent", BROWSER_USER_AGENT)
        .send()
        .await
        .ok()?;
    if !req.status().is_success() {
        return None;
    }

    let body = req.text().await.ok()?;
    scraper.page_title(&body)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;
    use crate::linkedin::scrape::LivePageScraper;

    const EVENT_PAGE: &str =
        "<html><head><title>Quarterly townhall | LinkedIn</title></head></html>";

    #[tokio::test]
    async fn find_title_reads_document_title() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events/123/comments/"))
            // wiremock's `header` matcher splits values on commas, which
            // breaks on the `(KHTML, like Gecko)` token in the user agent;
            // compare the raw header value instead
            .and(|request: &Request| {
                request
                    .headers
                    .get("User-Agent")
                    .is_some_and(|value| value == BROWSER_USER_AGENT)
            })
            .respond_with(ResponseTemplate::new(200).set_body_string(EVENT_PAGE))
            .mount(&mock_server)
            .await;

        let url = format!("{}/events/123/comments/", mock_server.uri());
        let title = find_title(&reqwest::Client::new(), &LivePageScraper, &url).await;

        assert_eq!(title, Some("Quarterly townhall | LinkedIn".to_string()));
    }

    #[tokio::test]
    async fn find_title_is_none_on_non_success_status() {
        let mock_server = MockServer::start().await;

        // The body still carries a parseable title; the status alone must
        // rule it out
        Mock::given(method("GET"))
            .and(path("/events/123/comments/"))
            .respond_with(ResponseTemplate::new(404).set_body_string(EVENT_PAGE))
            .mount(&mock_server)
            .await;

        let url = format!("{}/events/123/comments/", mock_server.uri());
        let title = find_title(&reqwest::Client::new(), &LivePageScraper, &url).await;

        assert_eq!(title, None);
    }

    #[tokio::test]
    async fn find_title_is_none_on_unreachable_host() {
        let mock_server = MockServer::start().await;
        let url = format!("{}/events/123/comments/", mock_server.uri());
        drop(mock_server);

        let title = find_title(&reqwest::Client::new(), &LivePageScraper, &url).await;
        assert_eq!(title, None);
    }
}
