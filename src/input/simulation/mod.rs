//! Simulated input sources for development and testing.

mod opener;

pub use opener::SimulatedOpener;
