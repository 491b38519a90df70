// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use std::path::Path;

/// Options controlling what a depot download materializes.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Path prefixes inside the depot to restrict the download to.
    /// Empty means the whole depot.
    pub files: Vec<String>,

    /// Move downloaded files out of their filter prefix directories,
    /// directly under the output directory.
    pub strip_file_prefixes: bool,
}

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Download the depot's contents into `output_dir`
    async fn download(
        &self,
        output_dir: &Path,
        app_id: u32,
        depot_id: u32,
        opts: &DownloadOptions,
    ) -> anyhow::Result<()>;
}
