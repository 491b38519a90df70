// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::downloader::{ContentFetcher, DownloadOptions};
use crate::steamdb::UpdateDateSource;

/// SteamDB depot manifests page reduced to the nodes the scraper reads
pub fn steamdb_depot_page(timestamp: &str) -> String {
    format!(
        r#"<html><body class="page-depots">
  <div class="body-content"><div class="container">
    <div id="manifests">
      <table class="table"><tbody>
        <tr>
          <td>4981853658237347976</td>
          <td><i class="timeago" title="{timestamp}">a while ago</i></td>
        </tr>
        <tr>
          <td>8881853658230000000</td>
          <td><i class="timeago" title="2019-01-01T00:00:00+00:00">older</i></td>
        </tr>
      </tbody></table>
    </div>
  </div></div>
</body></html>"#
    )
}

/// Veterancy guide page with the given intro heading and section markup
pub fn veterancy_guide_page(intro_heading: &str, sections: &str) -> String {
    format!(
        r#"<html><body>
  <div class="guide"><div class="content">
    <div class="section"><h3>{intro_heading}</h3></div>
    {sections}
  </div></div>
</body></html>"#
    )
}

/// Update-date source that always reports the same date
pub struct FixedUpdateDate(pub DateTime<Utc>);

#[async_trait]
impl UpdateDateSource for FixedUpdateDate {
    async fn depot_update_date(&self, _depot_id: u32) -> anyhow::Result<DateTime<Utc>> {
        Ok(self.0)
    }
}

/// Update-date source that always fails, like an unreachable lookup page
pub struct FailingUpdateDate;

#[async_trait]
impl UpdateDateSource for FailingUpdateDate {
    async fn depot_update_date(&self, depot_id: u32) -> anyhow::Result<DateTime<Utc>> {
        anyhow::bail!("failed to get depot history for {depot_id}")
    }
}

/// Fetcher that materializes a canned directory tree and counts calls
#[derive(Default)]
pub struct CannedTreeFetcher {
    files: Vec<(String, String)>,
    calls: AtomicUsize,
}

impl CannedTreeFetcher {
    pub fn new(files: Vec<(String, String)>) -> Self {
        Self {
            files,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentFetcher for CannedTreeFetcher {
    async fn download(
        &self,
        output_dir: &Path,
        _app_id: u32,
        _depot_id: u32,
        _opts: &DownloadOptions,
    ) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        for (name, contents) in &self.files {
            let path = output_dir.join(name);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, contents).await?;
        }
        Ok(())
    }
}
