#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
#![warn(clippy::perf)]
#![warn(clippy::complexity)]
#![warn(clippy::style)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::Result;
use clap::Parser;
use credentials::Credentials;
use linkedin::auth::Session;
use linkedin::scrape::LivePageScraper;
use tracing::info;
use util::init_http_client;

pub mod credentials;
pub mod linkedin;
pub mod util;

/// Resolves a LinkedIn live event / post video into its downloadable HLS stream variants
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// LinkedIn event / post URL to process
    url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let client = init_http_client();
    let mut session = Session::new(client);

    let credentials = Credentials::lookup();
    if credentials.is_none() {
        info!("No LinkedIn credentials configured, extracting without login");
    }

    let record = linkedin::extract(
        &mut session,
        &LivePageScraper,
        credentials.as_ref(),
        &args.url,
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}
