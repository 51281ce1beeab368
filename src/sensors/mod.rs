//! Coordinator-derived sensor entities.
//!
//! Sensors in this module are read-only projections of one field of the
//! coordinator's latest snapshot. They hold no state of their own beyond
//! their identity; every read goes back to the coordinator.
//!
//! The host talks to sensors only through the [`Entity`] and
//! [`BinarySensorEntity`] traits.

pub mod binary_sensor;
pub mod descriptor;
pub mod observer;

pub use binary_sensor::{EntityState, RyobiBinarySensor};
pub use descriptor::{BINARY_SENSORS, SensorDescriptor, SensorRegistry};
pub use observer::{LogObserver, NoopObserver, ReadObserver};

use crate::device_info::DeviceInfo;
use serde::Serialize;

/// Identity and grouping metadata for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityMetadata {
    pub name: String,
    pub unique_id: String,
    pub icon: String,
    pub device_info: DeviceInfo,
}

/// Capability interface every entity exposes to the host.
///
/// Implementations must be cheap to call and must not assume any call
/// order or frequency.
pub trait Entity: Send + Sync {
    /// Whether the host should trust the entity's current reading.
    fn availability(&self) -> bool;

    /// Current reading. `None` means the value is unknown.
    fn read(&self) -> Option<bool>;

    fn metadata(&self) -> EntityMetadata;
}

/// Host-facing binary sensor properties.
pub trait BinarySensorEntity: Entity {
    fn available(&self) -> bool {
        self.availability()
    }

    fn is_on(&self) -> Option<bool> {
        self.read()
    }

    fn icon(&self) -> &str;

    fn name(&self) -> &str;

    fn unique_id(&self) -> &str;

    fn device_info(&self) -> DeviceInfo;

    /// Rendered state, distinguishing an unavailable entity from an
    /// available one with an unknown value.
    fn state(&self) -> EntityState {
        EntityState::from_reading(self.available(), self.is_on())
    }
}
