//! Core domain types: detections, reference points, zone geometry, events

pub mod event;
pub mod geometry;
pub mod types;
