//! Business logic: zone registry, track-state store, and the ROI engine

pub mod engine;
pub mod registry;
pub mod store;

pub use engine::RoiEngine;
pub use registry::{LoadSummary, ZoneDefinition, ZoneRegistry};
pub use store::{TrackState, TrackStateStore};
