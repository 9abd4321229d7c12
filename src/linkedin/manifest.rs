//! Live manifest resolution
//!
//! The manifest URL scraped off the page points at a plain-text document
//! whose first entry is the path of the real HLS master playlist. That
//! playlist is then parsed into downloadable stream variants.

use anyhow::{Context, Result, bail, ensure};
use m3u8_rs::MasterPlaylist;
use reqwest::Url;
use tracing::{instrument, warn};

use crate::linkedin::structs::Format;

/// Fetches the live manifest and derives the master playlist URL from its
/// first non-empty, non-comment line
///
/// # Errors
/// Errors on network failure or when the manifest carries no playlist entry
#[instrument(skip(client))]
pub async fn derive_playlist_url(client: &reqwest::Client, manifest_url: &str) -> Result<String> {
    let body = client
        .get(manifest_url)
        .send()
        .await
        .context("Fetching live manifest")?
        .text()
        .await
        .context("Decoding live manifest")?;

    let path = playlist_path(&body).context("Live manifest contains no playlist entry")?;
    join_playlist_path(manifest_url, path)
}

/// Fetches and parses the master playlist into format descriptors.
///
/// Non-fatal by contract: any network or parse failure yields an empty list
/// so the extraction can still hand back the rest of the record.
#[instrument(skip(client))]
pub async fn resolve_formats(client: &reqwest::Client, playlist_url: &str) -> Vec<Format> {
    match fetch_master_playlist(client, playlist_url).await {
        Ok(playlist) => master_playlist_formats(playlist_url, &playlist),
        Err(e) => {
            warn!("Unable to resolve stream variants: {e:#}");
            Vec::new()
        }
    }
}

async fn fetch_master_playlist(
    client: &reqwest::Client,
    playlist_url: &str,
) -> Result<MasterPlaylist> {
    let req = client
        .get(playlist_url)
        .send()
        .await
        .context("Fetching master playlist")?;
    ensure!(
        req.status().is_success(),
        "Master playlist request returned {}",
        req.status()
    );

    let body = req.text().await.context("Decoding master playlist")?;
    match m3u8_rs::parse_master_playlist(body.as_bytes()) {
        Ok((_, playlist)) => Ok(playlist),
        Err(e) => bail!("Parsing master playlist: {e:?}"),
    }
}

/// Maps playlist variants to format descriptors, resolving relative variant
/// URIs against the playlist URL. Variants with unresolvable URIs are
/// skipped.
fn master_playlist_formats(playlist_url: &str, playlist: &MasterPlaylist) -> Vec<Format> {
    let base = Url::parse(playlist_url).ok();

    playlist
        .variants
        .iter()
        .filter_map(|variant| {
            let url = match Url::parse(&variant.uri) {
                Ok(absolute) => absolute.to_string(),
                Err(_) => base.as_ref()?.join(&variant.uri).ok()?.to_string(),
            };

            Some(Format {
                url,
                ext: "mp4".to_string(),
                tbr: Some(variant.bandwidth / 1000),
            })
        })
        .collect()
}

fn playlist_path(manifest: &str) -> Option<&str> {
    manifest
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
}

fn join_playlist_path(manifest_url: &str, path: &str) -> Result<String> {
    let (base, _) = manifest_url
        .rsplit_once('/')
        .context("Manifest URL carries no path to join against")?;
    Ok(format!("{base}/{path}"))
}
