//! Scraping-service client and URL utilities backing the submission form:
//! source liveness checks and page-title lookup.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

fn scraper_api_url() -> String {
    std::env::var("SCRAPER_API_URL").unwrap_or_else(|_| "https://api.scraperapi.com".into())
}

/// Rendered page content as relayed by the scraping service. The service
/// mirrors the target page's HTTP status.
pub struct ScrapedPage {
    pub status: u16,
    pub content: String,
}

pub async fn scrape_url(client: &reqwest::Client, target: &str) -> anyhow::Result<ScrapedPage> {
    let api_key = std::env::var("SCRAPER_API_KEY").context("SCRAPER_API_KEY must be set")?;

    let resp = client
        .get(scraper_api_url())
        .query(&[("api_key", api_key.as_str()), ("url", target)])
        .send()
        .await?;

    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        bail!("scraping service rejected our credentials ({})", status);
    }

    Ok(ScrapedPage {
        status: status.as_u16(),
        content: resp.text().await?,
    })
}

/// What the client sends to the URL utilities.
#[derive(Deserialize, Debug)]
pub struct ClientUrl<'a> {
    pub url: &'a str,
}

/// What the client receives from the page-title lookup.
#[derive(Serialize, Debug)]
pub struct ServerPageTitle {
    pub title: Option<String>,
}

/// Result of a liveness probe against a submitted source URL.
#[derive(Serialize, Debug)]
pub struct UrlCheck {
    pub ok: bool,
    pub status: Option<u16>,
}

/// Plain GET against the URL itself; unreachable hosts are reported as dead
/// rather than as errors.
pub async fn check_url(client: &reqwest::Client, url: &str) -> UrlCheck {
    match client.get(url).send().await {
        Ok(resp) => {
            let status = resp.status();
            UrlCheck {
                ok: status.is_success(),
                status: Some(status.as_u16()),
            }
        }
        Err(err) => {
            log::warn!("liveness check failed for {}: {}", url, err);
            UrlCheck {
                ok: false,
                status: None,
            }
        }
    }
}

/// `<title>` text of a page fetched through the scraping service.
pub async fn page_title(client: &reqwest::Client, url: &str) -> anyhow::Result<Option<String>> {
    let page = scrape_url(client, url).await?;
    Ok(extract_title(&page.content))
}

pub fn extract_title(html: &str) -> Option<String> {
    let dom = tl::parse(html, tl::ParserOptions::default()).ok()?;
    let parser = dom.parser();
    let handle = dom.query_selector("title")?.next()?;
    let title = handle.get(parser)?.inner_text(parser);
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_a_title() {
        let html = "<html><head><title>City Council Meeting Notes</title></head><body></body></html>";
        assert_eq!(
            extract_title(html).as_deref(),
            Some("City Council Meeting Notes")
        );
    }

    #[test]
    fn trims_whitespace_around_title() {
        let html = "<title>\n  Late Edition  \n</title>";
        assert_eq!(extract_title(html).as_deref(), Some("Late Edition"));
    }

    #[test]
    fn missing_or_empty_title_is_none() {
        assert_eq!(extract_title("<html><body>No head here</body></html>"), None);
        assert_eq!(extract_title("<title></title>"), None);
    }
}
