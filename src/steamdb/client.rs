// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

use crate::downloader::HttpClient;
use crate::steamdb::traits::UpdateDateSource;

static MANIFEST_ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body.page-depots .body-content > .container #manifests .table tbody tr")
        .expect("valid manifest row selector")
});

static TIMEAGO_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".timeago").expect("valid timeago selector"));

#[derive(thiserror::Error, Debug)]
pub enum SteamDbError {
    #[error("failed to get depot history: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no manifest rows found on the depot page")]
    MissingManifestRow,

    #[error("manifest row carries no update timestamp")]
    MissingTimestamp,

    #[error("could not parse depot update timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        source: chrono::ParseError,
    },
}

/// Looks up depot update dates by scraping the SteamDB manifests page.
pub struct SteamDbClient {
    http: HttpClient,
    base_url: String,
}

impl SteamDbClient {
    pub fn new(base_url: String) -> anyhow::Result<Self> {
        Ok(Self {
            http: HttpClient::new()?,
            base_url,
        })
    }
}

#[async_trait]
impl UpdateDateSource for SteamDbClient {
    async fn depot_update_date(&self, depot_id: u32) -> anyhow::Result<DateTime<Utc>> {
        let url = format!("{}/depot/{}/manifests/", self.base_url, depot_id);
        let html = self.http.get_text(&url).await.map_err(SteamDbError::Http)?;

        let last_updated = parse_manifest_date(&html)?;
        debug!(depot_id, last_updated = %last_updated, "Depot last updated");
        Ok(last_updated)
    }
}

/// Read the newest manifest row's timestamp from the depot page.
fn parse_manifest_date(html: &str) -> Result<DateTime<Utc>, SteamDbError> {
    let document = Html::parse_document(html);

    let row = document
        .select(&MANIFEST_ROW_SELECTOR)
        .next()
        .ok_or(SteamDbError::MissingManifestRow)?;

    let timestamp = row
        .select(&TIMEAGO_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("title"))
        .ok_or(SteamDbError::MissingTimestamp)?;

    DateTime::parse_from_rfc3339(timestamp)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|source| SteamDbError::InvalidTimestamp {
            value: timestamp.to_string(),
            source,
        })
}
