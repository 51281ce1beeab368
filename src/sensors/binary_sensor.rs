//! Binary sensors backed by the shared coordinator.
//!
//! A [`RyobiBinarySensor`] reads one key from the coordinator's latest
//! snapshot each time it is asked. Availability follows the coordinator's
//! last fetch; a missing key only makes the value unknown.

use super::observer::{LogObserver, ReadObserver};
use super::{BinarySensorEntity, Entity, EntityMetadata, SensorDescriptor};
use crate::coordinator::Coordinator;
use crate::device_info::{DOMAIN, DeviceInfo};
use serde_json::Value;
use std::sync::Arc;
use strum::{AsRefStr, Display, EnumString};

/// Prefix of every entity name and unique id.
pub const ENTITY_PREFIX: &str = DOMAIN;

/// Rendered state of a binary sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EntityState {
    On,
    Off,
    /// Fetch succeeded but the device did not report this field.
    Unknown,
    /// Last fetch failed; the value must not be trusted.
    Unavailable,
}

impl EntityState {
    pub fn from_reading(available: bool, is_on: Option<bool>) -> Self {
        match (available, is_on) {
            (false, _) => Self::Unavailable,
            (true, Some(true)) => Self::On,
            (true, Some(false)) => Self::Off,
            (true, None) => Self::Unknown,
        }
    }
}

/// Decode a snapshot value as an on/off flag.
///
/// Only a numeric 1 (or `true`) is on; anything else is off.
pub fn value_is_on(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::Bool(b) => *b,
        _ => false,
    }
}

/// Binary sensor for one snapshot key of one opener.
pub struct RyobiBinarySensor {
    descriptor: SensorDescriptor,
    coordinator: Arc<Coordinator>,
    observer: Arc<dyn ReadObserver>,
    device_id: String,
    name: String,
    unique_id: String,
}

impl RyobiBinarySensor {
    /// Create a sensor for `descriptor` on the opener `device_id`.
    ///
    /// Reads are reported to a [`LogObserver`].
    pub fn new(
        descriptor: SensorDescriptor,
        device_id: impl Into<String>,
        coordinator: Arc<Coordinator>,
    ) -> Self {
        let device_id = device_id.into();
        let name = format!("{}_{}_{}", ENTITY_PREFIX, descriptor.name, device_id);
        Self {
            descriptor,
            coordinator,
            observer: Arc::new(LogObserver),
            unique_id: name.clone(),
            name,
            device_id,
        }
    }

    /// Replace the read observer.
    pub fn with_observer(mut self, observer: Arc<dyn ReadObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn key(&self) -> &str {
        self.descriptor.key
    }}

impl Entity for RyobiBinarySensor {
    fn availability(&self) -> bool {
        self.coordinator.last_update_success()
    }

    fn read(&self) -> Option<bool> {
        let data = self.coordinator.data();
        let Some(value) = data.get(self.descriptor.key) else {
            self.observer.missing_key(self.descriptor.key);
            return None;
        };
        self.observer.value_read(self.descriptor.name, value);
        Some(value_is_on(value))
    }

    fn metadata(&self) -> EntityMetadata {
        EntityMetadata {
            name: self.name.clone(),
            unique_id: self.unique_id.clone(),
            icon: self.descriptor.icon.to_string(),
            device_info: self.device_info(),
        }
    }
}

impl BinarySensorEntity for RyobiBinarySensor {
    fn icon(&self) -> &str {
        self.descriptor.icon
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo::for_device(&self.device_id)
    }
}
