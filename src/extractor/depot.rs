// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::downloader::{ContentFetcher, DownloadOptions};
use crate::extractor::DataType;
use crate::extractor::traits::{DataExtractor, ExtractionRequest, ExtractionResult, Metadata};
use crate::steamdb::UpdateDateSource;

const VERSION_DATE_FORMAT: &str = "%d-%m-%Y";

const ATTRIBUTES_APP_ID: u32 = 313220;
const ATTRIBUTES_DEPOT_ID: u32 = 313221;
const ATTRIBUTES_FILE_FILTER: &str = "assets/data/attributes/";

const LOCALIZATION_APP_ID: u32 = 231430;
const LOCALIZATION_DEPOT_ID: u32 = 231432;
const LOCALIZATION_FILE_FILTER: &str = "CoH2/Locale/English/";

/// Depot-backed extractor; attributes and localization share this pipeline
/// and differ only in their depot coordinates and file filters.
pub struct DepotDataExtractor {
    data_type: DataType,
    app_id: u32,
    depot_id: u32,
    file_filters: Vec<String>,
    dates: Arc<dyn UpdateDateSource>,
    fetcher: Arc<dyn ContentFetcher>,
}

impl DepotDataExtractor {
    pub fn attributes(dates: Arc<dyn UpdateDateSource>, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            data_type: DataType::Attributes,
            app_id: ATTRIBUTES_APP_ID,
            depot_id: ATTRIBUTES_DEPOT_ID,
            file_filters: vec![ATTRIBUTES_FILE_FILTER.to_string()],
            dates,
            fetcher,
        }
    }

    pub fn localization(
        dates: Arc<dyn UpdateDateSource>,
        fetcher: Arc<dyn ContentFetcher>,
    ) -> Self {
        Self {
            data_type: DataType::Localization,
            app_id: LOCALIZATION_APP_ID,
            depot_id: LOCALIZATION_DEPOT_ID,
            file_filters: vec![LOCALIZATION_FILE_FILTER.to_string()],
            dates,
            fetcher,
        }
    }
}

#[async_trait]
impl DataExtractor for DepotDataExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> anyhow::Result<ExtractionResult> {
        let last_updated = self.dates.depot_update_date(self.depot_id).await?;
        let version_id = last_updated.format(VERSION_DATE_FORMAT).to_string();
        let version_dir = request.output_path.join(&version_id);

        let metadata = Metadata::new(last_updated.to_rfc3339())
            .with_extra("appId", self.app_id)
            .with_extra("depotId", self.depot_id);

        let completed = if version_dir.exists() {
            warn!(
                data_type = %self.data_type,
                version = %version_id,
                "Data already downloaded"
            );
            false
        } else {
            info!(
                data_type = %self.data_type,
                version = %version_id,
                "Downloading depot data"
            );
            tokio::fs::create_dir_all(&version_dir).await?;

            let opts = DownloadOptions {
                files: self.file_filters.clone(),
                strip_file_prefixes: request.strip_folder_prefixes.unwrap_or(true),
            };
            self.fetcher
                .download(&version_dir, self.app_id, self.depot_id, &opts)
                .await?;
            true
        };

        Ok(ExtractionResult {
            version_id,
            metadata,
            final_output_path: version_dir,
            completed,
        })
    }
}
