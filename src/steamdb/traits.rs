// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UpdateDateSource: Send + Sync {
    /// Date the given depot was last updated upstream
    async fn depot_update_date(&self, depot_id: u32) -> anyhow::Result<DateTime<Utc>>;
}
