// SPDX-License-Identifier: GPL-3.0-only
pub mod client;
pub mod depot_tool;
pub mod traits;

pub use client::HttpClient;
pub use depot_tool::{DepotToolError, DepotToolFetcher};
pub use traits::{ContentFetcher, DownloadOptions};
