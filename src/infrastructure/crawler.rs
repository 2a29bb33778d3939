use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::page::{PageMetadata, PageRecord};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Client for a Firecrawl-compatible crawl API: start a job for a seed URL,
/// poll it to completion, then walk the paginated result set.
pub struct FirecrawlClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    poll_interval: Duration,
}

#[derive(Serialize)]
struct CrawlRequest<'a> {
    url: &'a str,
    limit: usize,
    #[serde(rename = "scrapeOptions")]
    scrape_options: ScrapeOptions<'a>,
}

#[derive(Serialize)]
struct ScrapeOptions<'a> {
    formats: &'a [&'a str],
}

#[derive(Deserialize)]
struct CrawlStarted {
    id: String,
}

#[derive(Deserialize)]
struct CrawlStatus {
    status: String,
    #[serde(default)]
    data: Vec<CrawlPage>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Deserialize, Default)]
struct CrawlPage {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    metadata: CrawlPageMetadata,
}

#[derive(Deserialize, Default)]
struct CrawlPageMetadata {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default, rename = "sourceURL")]
    source_url: Option<String>,
}

impl FirecrawlClient {
    pub fn new(api_url: String, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("failed to build crawler HTTP client")?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Crawls `seed_url` requesting markdown and HTML formats, following
    /// continuation links until the result set is exhausted. Pages come back
    /// normalized, in the order the API returned them.
    pub async fn crawl(&self, seed_url: &str, page_limit: usize) -> Result<Vec<PageRecord>> {
        let started = self.start_crawl(seed_url, page_limit).await?;
        let status_url = format!("{}/v1/crawl/{}", self.api_url, started.id);

        let mut status = loop {
            let current = self.fetch_status(&status_url).await?;
            match current.status.as_str() {
                "scraping" | "waiting" => tokio::time::sleep(self.poll_interval).await,
                "failed" | "cancelled" => {
                    bail!("crawl job {} ended with status '{}'", started.id, current.status)
                }
                _ => break current,
            }
        };

        let mut pages = Vec::new();
        loop {
            for page in status.data {
                pages.push(normalize_page(page));
            }
            match status.next {
                Some(next_url) => status = self.fetch_status(&next_url).await?,
                None => break,
            }
        }

        log::info!("Crawl of {} yielded {} pages.", seed_url, pages.len());
        Ok(pages)
    }

    async fn start_crawl(&self, seed_url: &str, page_limit: usize) -> Result<CrawlStarted> {
        let body = CrawlRequest {
            url: seed_url,
            limit: page_limit,
            scrape_options: ScrapeOptions {
                formats: &["markdown", "html"],
            },
        };
        let response = self
            .client
            .post(format!("{}/v1/crawl", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to submit crawl job")?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("crawler returned {}: {}", status, text);
        }
        response
            .json::<CrawlStarted>()
            .await
            .context("failed to decode crawl job response")
    }

    async fn fetch_status(&self, url: &str) -> Result<CrawlStatus> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .with_context(|| format!("failed to fetch crawl status from {url}"))?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("crawler returned {}: {}", status, text);
        }
        response
            .json::<CrawlStatus>()
            .await
            .context("failed to decode crawl status response")
    }
}

/// Content prefers markdown over HTML, falling back to empty. Missing
/// metadata gets the documented defaults; `crawl_date` is stamped here.
fn normalize_page(page: CrawlPage) -> PageRecord {
    let content = page
        .markdown
        .filter(|m| !m.is_empty())
        .or(page.html)
        .unwrap_or_default();
    PageRecord {
        content,
        url: page.metadata.source_url.unwrap_or_default(),
        metadata: PageMetadata {
            title: page.metadata.title.unwrap_or_default(),
            description: page.metadata.description.unwrap_or_default(),
            language: page
                .metadata
                .language
                .unwrap_or_else(|| "en".to_string()),
            crawl_date: Utc::now().to_rfc3339(),
        },
    }
}
