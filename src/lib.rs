//! Ryobi garage door opener bridge library.
//!
//! This library provides a shared polling coordinator for an opener's status
//! payload and the binary sensors derived from it.

pub mod config;
pub mod coordinator;
pub mod device_info;
pub mod error;
pub mod input;
pub mod platform;
pub mod sensors;

#[cfg(test)]
mod test_logger;

pub use coordinator::{Coordinator, Snapshot, SnapshotSource};
pub use error::{BridgeError, Result};
pub use platform::{EntitySink, setup_entry};
pub use sensors::{BinarySensorEntity, EntityState, RyobiBinarySensor, SensorRegistry};
