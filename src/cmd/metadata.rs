use anyhow::Result;

use crosspost::{Config, HttpClient, MetadataFetcher};

pub async fn cmd_metadata(config: &Config, url: &str) -> Result<()> {
    let fetcher = MetadataFetcher::new(HttpClient::with_timeout(config.fetch_timeout())?);
    let metadata = fetcher.fetch_metadata(url).await;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}
