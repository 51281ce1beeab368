//! Snapshot sources for the coordinator.
//!
//! Each input source produces complete snapshots of opener state that the
//! coordinator publishes to its sensors.
//!
//! Current input sources:
//! - `file`: JSON status payload read from disk
//! - `simulation`: simulated opener toggling park assist

pub mod file;
pub mod simulation;

pub use file::JsonFileSource;
pub use simulation::SimulatedOpener;
