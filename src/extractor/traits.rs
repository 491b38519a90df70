// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::error;

pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Per-invocation input to an extractor.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Root directory for this data type; version directories go under it.
    pub output_path: PathBuf,

    /// Override for stripping depot filter prefixes; extractors fall back
    /// to their own default when unset.
    pub strip_folder_prefixes: Option<bool>,
}

/// Record of when the source was last updated and when the extraction ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub last_updated: String,
    pub extracted_on: String,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Metadata {
    /// Fresh metadata stamped with the current time as the extraction time.
    pub fn new(last_updated: impl Into<String>) -> Self {
        Self {
            last_updated: last_updated.into(),
            extracted_on: Utc::now().to_rfc3339(),
            extra: IndexMap::new(),
        }
    }

    pub fn with_extra(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Outcome of one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Date string naming the version directory (DD-MM-YYYY).
    pub version_id: String,

    pub metadata: Metadata,
    pub final_output_path: PathBuf,

    /// False when this version had already been extracted earlier.
    pub completed: bool,
}

#[async_trait]
pub trait DataExtractor: Send + Sync {
    async fn extract(&self, request: &ExtractionRequest) -> anyhow::Result<ExtractionResult>;
}

/// Run an extractor and persist its metadata next to the payload.
///
/// A completed result whose output directory is missing gets logged and left
/// without metadata; the payload is the primary deliverable, so the run
/// still counts as successful.
pub async fn run_extraction(
    extractor: &dyn DataExtractor,
    request: &ExtractionRequest,
) -> anyhow::Result<ExtractionResult> {
    let result = extractor.extract(request).await?;

    if result.completed {
        if result.final_output_path.is_dir() {
            let metadata_path = result.final_output_path.join(METADATA_FILE_NAME);
            let json = serde_json::to_string_pretty(&result.metadata)?;
            tokio::fs::write(&metadata_path, json).await?;
        } else {
            error!(
                path = %result.final_output_path.display(),
                "Extraction output directory is missing, skipping metadata write"
            );
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct StubExtractor {
        completed: bool,
        output_path: PathBuf,
    }

    #[async_trait]
    impl DataExtractor for StubExtractor {
        async fn extract(&self, _request: &ExtractionRequest) -> anyhow::Result<ExtractionResult> {
            Ok(ExtractionResult {
                version_id: "14-03-2021".to_string(),
                metadata: Metadata::new("2021-03-14T18:21:26+00:00"),
                final_output_path: self.output_path.clone(),
                completed: self.completed,
            })
        }
    }

    fn request_for(dir: &TempDir) -> ExtractionRequest {
        ExtractionRequest {
            output_path: dir.path().to_path_buf(),
            strip_folder_prefixes: None,
        }
    }

    #[test]
    fn test_metadata_round_trip() {
        let metadata = Metadata::new("2021-03-14T18:21:26+00:00")
            .with_extra("appId", 313220)
            .with_extra("depotId", 313221);

        let json = serde_json::to_string_pretty(&metadata).unwrap();
        let parsed: Metadata = serde_json::from_str(&json).unwrap();

        assert!(!parsed.last_updated.is_empty());
        assert!(!parsed.extracted_on.is_empty());
        assert_eq!(parsed.last_updated, "2021-03-14T18:21:26+00:00");
        assert_eq!(parsed.extra["appId"], 313220);
        assert_eq!(parsed.extra["depotId"], 313221);
    }

    #[test]
    fn test_metadata_uses_camel_case_keys() {
        let json = serde_json::to_string(&Metadata::new("x")).unwrap();
        assert!(json.contains("\"lastUpdated\""));
        assert!(json.contains("\"extractedOn\""));
    }

    #[tokio::test]
    async fn test_run_extraction_writes_metadata() {
        let dir = TempDir::new().unwrap();
        let extractor = StubExtractor {
            completed: true,
            output_path: dir.path().to_path_buf(),
        };

        let result = run_extraction(&extractor, &request_for(&dir)).await.unwrap();
        assert!(result.completed);

        let metadata_path = dir.path().join(METADATA_FILE_NAME);
        let contents = std::fs::read_to_string(metadata_path).unwrap();
        let parsed: Metadata = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.last_updated, "2021-03-14T18:21:26+00:00");
        assert!(!parsed.extracted_on.is_empty());
    }

    #[tokio::test]
    async fn test_run_extraction_skips_metadata_when_not_completed() {
        let dir = TempDir::new().unwrap();
        let extractor = StubExtractor {
            completed: false,
            output_path: dir.path().to_path_buf(),
        };

        run_extraction(&extractor, &request_for(&dir)).await.unwrap();

        assert!(!dir.path().join(METADATA_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_run_extraction_tolerates_missing_output_dir() {
        let dir = TempDir::new().unwrap();
        let extractor = StubExtractor {
            completed: true,
            output_path: dir.path().join("not-created"),
        };

        // Inconsistent result, but metadata persistence must not fail the run
        let result = run_extraction(&extractor, &request_for(&dir)).await.unwrap();
        assert!(result.completed);
        assert!(!dir.path().join("not-created").exists());
    }
}
