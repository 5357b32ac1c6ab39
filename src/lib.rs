//! Per-camera Region-of-Interest engine
//!
//! Tracks whether moving objects (identified by persistent track IDs) are
//! inside configured polygonal zones and emits enter / exit / dwell-threshold
//! events as they cross boundaries or linger. Detection, video, and event
//! transport are external collaborators.
//!
//! Module structure:
//! - `domain/` - Core types (Detection, ReferencePoint, geometry, RoiEvent)
//! - `infra/` - Infrastructure (zones document, injectable clocks)
//! - `io/` - File egress for event payloads (replay tooling)
//! - `services/` - Business logic (ZoneRegistry, TrackStateStore, RoiEngine)

pub mod domain;
pub mod infra;
pub mod io;
pub mod services;
