// SPDX-License-Identifier: GPL-3.0-only
mod cli;
mod config;
mod downloader;
mod extractor;
mod logging;
mod steamdb;
#[cfg(test)]
mod test_helpers;
mod utils;

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use cli::Cli;
use config::Config;
use downloader::{ContentFetcher, DepotToolFetcher};
use extractor::{
    DataExtractor, DataType, DepotDataExtractor, ExtractionRequest, VeterancyExtractor,
    run_extraction,
};
use logging::setup_logging;
use steamdb::{SteamDbClient, UpdateDateSource};
use utils::update_latest_symlink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    setup_logging(&config.log_level)?;

    // Failures are reported through the log, not the exit status
    if let Err(e) = run(cli, config).await {
        error!(error = %e, "Extraction failed");
    }
    Ok(())
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let data_type: DataType = cli.data_type.parse()?;

    let type_dir = cli.output_dir.join(data_type.as_str());
    tokio::fs::create_dir_all(&type_dir).await?;

    let extractor: Box<dyn DataExtractor> = match data_type {
        DataType::Veterancy => {
            Box::new(VeterancyExtractor::new(config.veterancy_guide_url.clone())?)
        }
        DataType::Attributes | DataType::Localization => {
            let dates: Arc<dyn UpdateDateSource> =
                Arc::new(SteamDbClient::new(config.steamdb_base_url.clone())?);
            let fetcher: Arc<dyn ContentFetcher> =
                Arc::new(DepotToolFetcher::new(config.depot_downloader_path.clone()));

            if data_type == DataType::Attributes {
                Box::new(DepotDataExtractor::attributes(dates, fetcher))
            } else {
                Box::new(DepotDataExtractor::localization(dates, fetcher))
            }
        }
    };

    let request = ExtractionRequest {
        output_path: type_dir.clone(),
        strip_folder_prefixes: None,
    };
    let result = run_extraction(extractor.as_ref(), &request).await?;

    if result.completed {
        update_latest_symlink(&type_dir, &result.final_output_path)?;
        info!(
            data_type = %data_type,
            version = %result.version_id,
            "Successfully finished extracting"
        );
    } else {
        info!(data_type = %data_type, version = %result.version_id, "Nothing new to extract");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::veterancy_guide_page;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_veterancy_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        let body = veterancy_guide_page(
            "The Company of Heroes 2 Veterancy Guide (Last updated: 3-14-21)",
            r#"<div class="section"><div class="h1">Soviet</div></div>"#,
        );
        let mock = server
            .mock("GET", "/guide")
            .with_status(200)
            .with_body(body)
            .expect(2)
            .create_async()
            .await;

        let out = TempDir::new().unwrap();
        let config = Config {
            veterancy_guide_url: format!("{}/guide", server.url()),
            ..Config::default()
        };
        let cli = Cli {
            output_dir: out.path().to_path_buf(),
            data_type: "veterancy".to_string(),
        };
        run(cli, config.clone()).await.unwrap();

        let version_dir = out.path().join("veterancy").join("14-03-2021");
        assert!(version_dir.join("veterancy.json").exists());
        assert!(version_dir.join("metadata.json").exists());

        let latest = out.path().join("veterancy").join("latest");
        assert_eq!(
            std::fs::canonicalize(&latest).unwrap(),
            std::fs::canonicalize(&version_dir).unwrap()
        );

        // Same upstream version again: still a successful run, tree unchanged
        let cli = Cli {
            output_dir: out.path().to_path_buf(),
            data_type: "veterancy".to_string(),
        };
        run(cli, config).await.unwrap();
        assert_eq!(std::fs::read_link(&latest).unwrap(), PathBuf::from("14-03-2021"));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_run_unknown_type_errors() {
        let out = TempDir::new().unwrap();
        let cli = Cli {
            output_dir: out.path().to_path_buf(),
            data_type: "textures".to_string(),
        };

        let err = run(cli, Config::default()).await.unwrap_err();
        assert!(err.to_string().contains("unknown data type 'textures'"));
    }
}
