// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use dialoguer::{Input, Password};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::downloader::traits::{ContentFetcher, DownloadOptions};

const FILE_LIST_FILE_NAME: &str = "filelist.txt";
// State directory DepotDownloader leaves inside its output dir
const TOOL_STATE_DIR: &str = ".DepotDownloader";

#[derive(thiserror::Error, Debug)]
pub enum DepotToolError {
    #[error("could not start DepotDownloader: the dotnet runtime is not installed")]
    DotnetMissing,

    #[error("could not find DepotDownloader.dll, should be at {}", .0.display())]
    ToolMissing(PathBuf),

    #[error("failed to download depot {depot}: process exited with code {code}")]
    ProcessFailed { depot: u32, code: i32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Drives the external DepotDownloader .NET assembly as a child process.
pub struct DepotToolFetcher {
    tool_path: PathBuf,
}

impl DepotToolFetcher {
    pub fn new(tool_path: PathBuf) -> Self {
        Self { tool_path }
    }

    async fn ensure_dotnet() -> Result<(), DepotToolError> {
        let status = Command::new("dotnet")
            .arg("--info")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(DepotToolError::DotnetMissing),
        }
    }

    fn resolve_tool_path(&self) -> Result<PathBuf, DepotToolError> {
        let full_path = if self.tool_path.is_absolute() {
            self.tool_path.clone()
        } else {
            std::env::current_dir()?.join(&self.tool_path)
        };

        if !full_path.exists() {
            return Err(DepotToolError::ToolMissing(full_path));
        }
        Ok(full_path)
    }
}

#[async_trait]
impl ContentFetcher for DepotToolFetcher {
    async fn download(
        &self,
        output_dir: &Path,
        app_id: u32,
        depot_id: u32,
        opts: &DownloadOptions,
    ) -> anyhow::Result<()> {
        Self::ensure_dotnet().await?;
        let tool_path = self.resolve_tool_path()?;
        let (username, password) = prompt_credentials().await?;

        let mut args: Vec<String> = vec![
            tool_path.display().to_string(),
            "-app".into(),
            app_id.to_string(),
            "-depot".into(),
            depot_id.to_string(),
            "-username".into(),
            username,
            "-password".into(),
            password,
            "-dir".into(),
            output_dir.display().to_string(),
        ];

        // The file filters are passed to the tool through a temp file list;
        // the temp dir must outlive the child process.
        let mut file_list_dir = None;
        if !opts.files.is_empty() {
            let dir = tempfile::Builder::new()
                .prefix("depot-downloader")
                .tempdir()?;
            let file_list_path = dir.path().join(FILE_LIST_FILE_NAME);
            tokio::fs::write(&file_list_path, opts.files.join("\n")).await?;
            debug!(path = %file_list_path.display(), "Wrote depot file list");

            args.push("-filelist".into());
            args.push(file_list_path.display().to_string());
            file_list_dir = Some(dir);
        }

        // Stdio stays inherited: DepotDownloader may prompt for Steam Guard
        let status = Command::new("dotnet").args(&args).status().await?;

        info!(depot_id, "Depot download finished, cleaning up");
        drop(file_list_dir);

        remove_dir_if_exists(&output_dir.join(TOOL_STATE_DIR)).await?;

        if opts.strip_file_prefixes {
            strip_file_prefixes(output_dir, &opts.files).await?;
        }

        if !status.success() {
            return Err(DepotToolError::ProcessFailed {
                depot: depot_id,
                code: status.code().unwrap_or(-1),
            }
            .into());
        }
        Ok(())
    }
}

async fn prompt_credentials() -> anyhow::Result<(String, String)> {
    let credentials = tokio::task::spawn_blocking(|| {
        let username: String = Input::new().with_prompt("Steam username").interact_text()?;
        let password = Password::new().with_prompt("Steam password").interact()?;
        Ok::<_, dialoguer::Error>((username, password))
    })
    .await??;

    Ok(credentials)
}

async fn remove_dir_if_exists(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Move the files under each filter prefix directly into `output_dir` and
/// drop the now-empty prefix directories.
async fn strip_file_prefixes(output_dir: &Path, prefixes: &[String]) -> std::io::Result<()> {
    for prefix in prefixes {
        let prefix_dir = output_dir.join(prefix);
        if prefix_dir.is_dir() {
            let mut entries = tokio::fs::read_dir(&prefix_dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                tokio::fs::rename(entry.path(), output_dir.join(entry.file_name())).await?;
            }
        }

        if let Some(base) = Path::new(prefix).components().next() {
            remove_dir_if_exists(&output_dir.join(base.as_os_str())).await?;
        }
    }
    Ok(())
}
