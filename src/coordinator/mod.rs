//! Shared polling coordinator.
//!
//! The coordinator owns the latest [`Snapshot`] fetched from the opener and
//! the success flag of the last fetch. Sensors hold an `Arc<Coordinator>`
//! and read both on demand; the coordinator is the only writer.
//!
//! Snapshots are published by swapping the whole `Arc`, so a reader sees
//! either the previous snapshot or the new one, never a mix.

pub mod source;

pub use source::{SnapshotSource, StaticSource};

use crate::error::{BridgeError, Result};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Immutable mapping of device field names to scalar values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(HashMap<String, Value>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a snapshot from a JSON value, which must be an object.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(BridgeError::InvalidSnapshot(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl From<Map<String, Value>> for Snapshot {
    fn from(map: Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Shared coordinator polled by the host and read by every sensor.
pub struct Coordinator {
    name: String,
    source: Option<Arc<dyn SnapshotSource>>,
    data: RwLock<Arc<Snapshot>>,
    last_update_success: AtomicBool,
    /// Set once a failed refresh has been logged at error level.
    failure_reported: AtomicBool,
    last_update_time: RwLock<Option<DateTime<Utc>>>,
    version: AtomicU32,
}

impl Coordinator {
    /// Create a coordinator that fetches from `source`.
    ///
    /// Starts with an empty snapshot and is unavailable until the first
    /// successful refresh.
    pub fn new(name: impl Into<String>, source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            name: name.into(),
            source: Some(source),
            data: RwLock::new(Arc::new(Snapshot::new())),
            last_update_success: AtomicBool::new(false),
            failure_reported: AtomicBool::new(false),
            last_update_time: RwLock::new(None),
            version: AtomicU32::new(0),
        }
    }

    /// Create a coordinator with a fixed state and no source.
    ///
    /// State can still be changed through [`set_snapshot`](Self::set_snapshot)
    /// and [`set_update_failed`](Self::set_update_failed).
    pub fn with_data(snapshot: Snapshot, last_update_success: bool) -> Self {
        Self {
            name: "static".to_string(),
            source: None,
            data: RwLock::new(Arc::new(snapshot)),
            last_update_success: AtomicBool::new(last_update_success),
            failure_reported: AtomicBool::new(false),
            last_update_time: RwLock::new(None),
            version: AtomicU32::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest published snapshot.
    pub fn data(&self) -> Arc<Snapshot> {
        self.data.read().clone()
    }

    pub fn last_update_success(&self) -> bool {
        self.last_update_success.load(Ordering::SeqCst)
    }

    /// Time of the last successful publication.
    pub fn last_update_time(&self) -> Option<DateTime<Utc>> {
        *self.last_update_time.read()
    }

    /// Incremented on every publication, successful or not.
    pub fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }

    /// Fetch a new snapshot from the source and publish the outcome.
    ///
    /// On failure the previous snapshot is kept and the coordinator is
    /// marked unsuccessful until the next good fetch.
    pub async fn refresh(&self) -> Result<()> {
        let Some(source) = self.source.as_ref() else {
            self.set_update_failed();
            return Err(BridgeError::FetchFailed(format!(
                "coordinator {} has no snapshot source",
                self.name
            )));
        };

        match source.fetch().await {
            Ok(snapshot) => {
                debug!(
                    "[Coordinator] {} fetched {} field(s)",
                    self.name,
                    snapshot.len()
                );
                self.set_snapshot(snapshot);
                Ok(())
            }
            Err(e) => {
                if !self.failure_reported.swap(true, Ordering::SeqCst) {
                    error!("[Coordinator] {} update failed: {}", self.name, e);
                } else {
                    debug!("[Coordinator] {} update still failing: {}", self.name, e);
                }
                self.set_update_failed();
                Err(e)
            }
        }
    }

    /// Publish a freshly fetched snapshot.
    pub fn set_snapshot(&self, snapshot: Snapshot) {
        *self.data.write() = Arc::new(snapshot);
        *self.last_update_time.write() = Some(Utc::now());
        self.last_update_success.store(true, Ordering::SeqCst);
        self.version.fetch_add(1, Ordering::SeqCst);
        if self.failure_reported.swap(false, Ordering::SeqCst) {
            info!("[Coordinator] {} update recovered", self.name);
        }
    }

    /// Record a failed fetch without touching the current snapshot.
    pub fn set_update_failed(&self) {
        self.last_update_success.store(false, Ordering::SeqCst);
        self.version.fetch_add(1, Ordering::SeqCst);
    }

    /// Spawn a task that refreshes the coordinator every `period` until
    /// `cancel` fires. The first refresh runs immediately.
    pub fn spawn_polling(
        self: Arc<Self>,
        period: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("[Coordinator] {} polling every {:?}", self.name, period);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = self.refresh().await {
                            debug!("[Coordinator] {} poll failed: {}", self.name, e);
                        }
                    }
                }
            }
            info!("[Coordinator] {} polling stopped", self.name);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    /// Returns `{"park_assist": <call count>}` until told to fail.
    struct CountingSource {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl SnapshotSource for CountingSource {
        async fn fetch(&self) -> Result<Snapshot> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail.load(Ordering::SeqCst) {
                return Err(BridgeError::FetchFailed("device offline".to_string()));
            }
            Ok([("park_assist", n)].into_iter().collect())
        }
    }

    #[test]
    fn test_initial_state() {
        let coordinator = Coordinator::new("gdo", Arc::new(CountingSource::new()));
        assert!(coordinator.data().is_empty());
        assert!(!coordinator.last_update_success());
        assert!(coordinator.last_update_time().is_none());
        assert_eq!(coordinator.version(), 0);
    }

    #[test]
    fn test_refresh_publishes_snapshot() {
        let coordinator = Coordinator::new("gdo", Arc::new(CountingSource::new()));
        tokio_test::block_on(coordinator.refresh()).unwrap();

        assert!(coordinator.last_update_success());
        assert!(coordinator.last_update_time().is_some());
        assert_eq!(coordinator.data().get("park_assist"), Some(&json!(1)));
        assert_eq!(coordinator.version(), 1);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_snapshot() {
        let source = Arc::new(CountingSource::new());
        let coordinator = Coordinator::new("gdo", source.clone());
        tokio_test::block_on(coordinator.refresh()).unwrap();
        let before = coordinator.data();

        source.fail.store(true, Ordering::SeqCst);
        let result = tokio_test::block_on(coordinator.refresh());
        assert!(matches!(result, Err(BridgeError::FetchFailed(_))));
        assert!(!coordinator.last_update_success());
        assert_eq!(*coordinator.data(), *before);
        assert_eq!(coordinator.version(), 2);

        source.fail.store(false, Ordering::SeqCst);
        tokio_test::block_on(coordinator.refresh()).unwrap();
        assert!(coordinator.last_update_success());
        assert_eq!(coordinator.data().get("park_assist"), Some(&json!(3)));
    }

    #[test]
    fn test_readers_keep_their_snapshot_across_swaps() {
        let coordinator = Coordinator::with_data([("park_assist", 1)].into_iter().collect(), true);
        let held = coordinator.data();

        coordinator.set_snapshot([("park_assist", 0)].into_iter().collect());
        assert_eq!(held.get("park_assist"), Some(&json!(1)));
        assert_eq!(coordinator.data().get("park_assist"), Some(&json!(0)));
    }

    #[test]
    fn test_failures_logged_once_until_recovery() {
        crate::test_logger::capture();
        let source = Arc::new(CountingSource::new());
        source.fail.store(true, Ordering::SeqCst);
        let coordinator = Coordinator::new("gdo", source.clone());

        assert!(tokio_test::block_on(coordinator.refresh()).is_err());
        assert!(tokio_test::block_on(coordinator.refresh()).is_err());
        source.fail.store(false, Ordering::SeqCst);
        tokio_test::block_on(coordinator.refresh()).unwrap();
        tokio_test::block_on(coordinator.refresh()).unwrap();

        let records = crate::test_logger::take();
        let errors: Vec<_> = records
            .iter()
            .filter(|(level, _)| *level == log::Level::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].1.contains("gdo update failed"));

        let recoveries: Vec<_> = records
            .iter()
            .filter(|(level, msg)| *level == log::Level::Info && msg.contains("recovered"))
            .collect();
        assert_eq!(recoveries.len(), 1);
    }

    #[test]
    fn test_first_success_is_not_a_recovery() {
        crate::test_logger::capture();
        let coordinator = Coordinator::new("gdo", Arc::new(CountingSource::new()));
        tokio_test::block_on(coordinator.refresh()).unwrap();

        let records = crate::test_logger::take();
        assert!(records.iter().all(|(level, _)| *level > log::Level::Info));
    }

    #[test]
    fn test_refresh_without_source_fails() {
        let coordinator = Coordinator::with_data(Snapshot::new(), true);
        let result = tokio_test::block_on(coordinator.refresh());
        assert!(matches!(result, Err(BridgeError::FetchFailed(_))));
        assert!(!coordinator.last_update_success());
    }

    #[test]
    fn test_snapshot_from_json() {
        let snapshot =
            Snapshot::from_json(json!({"park_assist": 1, "door_state": "closed"})).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains_key("door_state"));

        let err = Snapshot::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidSnapshot(msg) if msg.contains("array")));
    }

    #[tokio::test]
    async fn test_polling_stops_on_cancel() {
        let source = Arc::new(CountingSource::new());
        let coordinator = Arc::new(Coordinator::new("gdo", source.clone()));
        let cancel = CancellationToken::new();

        let handle = coordinator
            .clone()
            .spawn_polling(Duration::from_millis(10), cancel.clone());
        tokio::time::sleep(Duration::from_millis(35)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert!(source.calls.load(Ordering::SeqCst) >= 1);
        assert!(coordinator.last_update_success());
    }
}
