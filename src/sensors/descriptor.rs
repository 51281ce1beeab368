//! Static sensor descriptions.
//!
//! Adding a boolean-flag sensor only takes a new [`SensorDescriptor`] in
//! [`BINARY_SENSORS`]; setup creates one entity per entry.

use crate::error::{BridgeError, Result};
use std::collections::HashSet;

/// Display metadata and snapshot key for one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorDescriptor {
    /// Snapshot field this sensor reads.
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

impl SensorDescriptor {
    pub const fn new(key: &'static str, name: &'static str, icon: &'static str) -> Self {
        Self { key, name, icon }
    }
}

/// Binary sensors exposed for every opener.
pub const BINARY_SENSORS: &[SensorDescriptor] = &[SensorDescriptor::new(
    "park_assist",
    "Park Assist",
    "mdi:parking",
)];

/// Immutable, ordered set of sensor descriptors passed to platform setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorRegistry {
    descriptors: Vec<SensorDescriptor>,
}

impl SensorRegistry {
    /// Registry containing [`BINARY_SENSORS`].
    pub fn builtin() -> Self {
        Self {
            descriptors: BINARY_SENSORS.to_vec(),
        }
    }

    /// Build a registry from descriptors, rejecting duplicate keys.
    pub fn from_descriptors(descriptors: &[SensorDescriptor]) -> Result<Self> {
        let mut seen = HashSet::new();
        for descriptor in descriptors {
            if !seen.insert(descriptor.key) {
                return Err(BridgeError::DuplicateSensorKey(descriptor.key.to_string()));
            }
        }
        Ok(Self {
            descriptors: descriptors.to_vec(),
        })
    }

    /// Return a copy of this registry with `descriptor` appended.
    pub fn with(&self, descriptor: SensorDescriptor) -> Result<Self> {
        if self.get(descriptor.key).is_some() {
            return Err(BridgeError::DuplicateSensorKey(descriptor.key.to_string()));
        }
        let mut descriptors = self.descriptors.clone();
        descriptors.push(descriptor);
        Ok(Self { descriptors })
    }

    pub fn get(&self, key: &str) -> Option<&SensorDescriptor> {
        self.descriptors.iter().find(|d| d.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for SensorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
