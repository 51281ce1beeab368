//! JSON file snapshot source.
//!
//! Reads a flat JSON object from disk on every fetch. Lets another process
//! (a cron job, a shell script talking to the opener's API) drop the latest
//! status payload into a file for the bridge to pick up.

use crate::coordinator::{Snapshot, SnapshotSource};
use crate::error::Result;
use async_trait::async_trait;
use log::debug;
use std::path::PathBuf;

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for JsonFileSource {
    async fn fetch(&self) -> Result<Snapshot> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        debug!("Read {} byte(s) from {}", content.len(), self.path.display());
        let value: serde_json::Value = serde_json::from_str(&content)?;
        Snapshot::from_json(value)
    }
}
