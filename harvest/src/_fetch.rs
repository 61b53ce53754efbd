use reqwest::blocking::Client;
use url::Url;

use crate::{HarvestConfig, HarvestError, Page};

/// The Accept HTTP header sent when fetching pages.
pub const ACCEPT: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.1";

/// Download the page at `url`.
///
/// `http` and `https` URLs are fetched with a blocking HTTP client,
/// configured by `config`;
/// `file` URLs are read from the local file system.
pub fn fetch(url: &Url, config: &HarvestConfig) -> Result<String, HarvestError> {
    match url.scheme() {
        "http" | "https" => {
            log::info!("fetching {url}");
            let client = Client::builder()
                .user_agent(config.user_agent())
                .timeout(config.timeout())
                .build()?;
            let resp = client
                .get(url.clone())
                .header("Accept", ACCEPT)
                .send()?
                .error_for_status()?;
            Ok(resp.text()?)
        }
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|_| HarvestError::UnsupportedScheme(url.to_string()))?;
            log::info!("reading {}", path.display());
            Ok(std::fs::read_to_string(path)?)
        }
        other => Err(HarvestError::UnsupportedScheme(other.to_string())),
    }
}

/// Fetch and scrape the page at `url`,
/// keeping only the links matching the link pattern of `config` (if any).
pub fn harvest(url: &str, config: &HarvestConfig) -> Result<Page, HarvestError> {
    let url = Url::parse(url)?;
    let html = fetch(&url, config)?;
    let mut page = Page::parse(&url, &html);
    if let Some(pattern) = config.link_pattern() {
        page.retain_links(pattern);
    }
    log::debug!("harvested {} links from {}", page.links.len(), page.url);
    Ok(page)
}
