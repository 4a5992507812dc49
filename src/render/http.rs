// src/render/http.rs

//! HTTP-backed page renderer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::CrawlerConfig;
use crate::render::{Page, PageRenderer};

/// Fetches pages over HTTP within one cookie-carrying session.
pub struct HttpRenderer {
    client: Client,
    delay: Duration,
}

impl HttpRenderer {
    /// Create a renderer with the given crawling behavior settings.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            delay: Duration::from_millis(config.request_delay_ms),
        })
    }
}

#[async_trait(?Send)]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<Page> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        log::debug!("GET {url}");
        let text = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(Page::parse(url, &text))
    }
}
