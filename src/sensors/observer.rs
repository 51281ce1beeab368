//! Read observers for sensor diagnostics.
//!
//! Sensors report what they saw in the snapshot to an observer instead of
//! logging directly, so reads stay free of side effects in tests.

use log::{debug, info};
use serde_json::Value;

/// Receives notes about sensor reads. Must not panic.
pub trait ReadObserver: Send + Sync {
    /// The sensor's key was absent from the snapshot.
    fn missing_key(&self, key: &str);

    /// The sensor read `value` from the snapshot.
    fn value_read(&self, name: &str, value: &Value);
}

/// Default observer: missing keys at info, raw values at debug.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ReadObserver for LogObserver {
    fn missing_key(&self, key: &str) {
        info!("binary_sensor [{}] not supported.", key);
    }

    fn value_read(&self, name: &str, value: &Value) {
        debug!("binary_sensor [{}]: {}", name, value);
    }
}

/// Observer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ReadObserver for NoopObserver {
    fn missing_key(&self, _key: &str) {}

    fn value_read(&self, _name: &str, _value: &Value) {}
}
