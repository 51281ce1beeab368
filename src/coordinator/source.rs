//! Snapshot sources consumed by the coordinator.

use super::Snapshot;
use crate::error::Result;
use async_trait::async_trait;

/// Fetches one complete snapshot of device state.
///
/// This is the seam to the device API client. The coordinator calls
/// `fetch` once per refresh and publishes whatever comes back as a whole.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<Snapshot>;
}

/// Source that always returns the same snapshot.
pub struct StaticSource {
    snapshot: Snapshot,
}

impl StaticSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl SnapshotSource for StaticSource {
    async fn fetch(&self) -> Result<Snapshot> {
        Ok(self.snapshot.clone())
    }
}
