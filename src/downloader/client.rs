// SPDX-License-Identifier: GPL-3.0-only
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

// Some of the scraped sites reject non-browser user agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/81.0.4044.138";

pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch a page and return its body. Non-2xx statuses are errors.
    pub async fn get_text(&self, url: &str) -> Result<String, reqwest::Error> {
        debug!(url = %url, "Fetching page");

        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        response.text().await
    }
}
