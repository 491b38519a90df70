// SPDX-License-Identifier: GPL-3.0-only
use clap::Parser;
use std::path::PathBuf;

/// Downloads versioned Company of Heroes 2 game data snapshots.
#[derive(Debug, Parser)]
#[command(name = "coh2-data-extractor", version)]
pub struct Cli {
    /// The output folder
    #[arg(long = "output-dir")]
    pub output_dir: PathBuf,

    /// Type of data to download. Valid types are 'attributes',
    /// 'localization', 'veterancy'
    #[arg(long = "type")]
    pub data_type: String,
}
