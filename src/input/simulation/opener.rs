//! Simulated garage door opener for testing.
//!
//! Produces snapshots shaped like the opener's status payload without any
//! network access. Useful for development and for exercising both the
//! unknown and unavailable paths of the sensors.

use crate::coordinator::{Snapshot, SnapshotSource};
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use log::info;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};

/// Snapshot source that toggles park assist on every fetch.
///
/// The first fetch omits `park_assist`, as firmware that has not reported the
/// field yet would. With `fail_every` set, every n-th fetch fails.
pub struct SimulatedOpener {
    fetches: AtomicU32,
    fail_every: Option<u32>,
}

impl SimulatedOpener {
    pub fn new() -> Self {
        Self {
            fetches: AtomicU32::new(0),
            fail_every: None,
        }
    }

    /// Fail every `n`-th fetch. `0` disables failures.
    pub fn with_failures_every(mut self, n: u32) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedOpener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotSource for SimulatedOpener {
    async fn fetch(&self) -> Result<Snapshot> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(every) = self.fail_every
            && n % every == 0
        {
            info!("[Sim] Fetch #{} failing", n);
            return Err(BridgeError::FetchFailed(format!(
                "simulated timeout on fetch #{}",
                n
            )));
        }

        let mut payload = json!({
            "door_state": "closed",
            "light_state": false,
            "vacation_mode": 0,
        });
        if n > 1 {
            payload["park_assist"] = json!(n % 2);
        }
        info!("[Sim] Fetch #{}: {}", n, payload);
        Snapshot::from_json(payload)
    }
}
