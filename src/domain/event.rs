//! ROI lifecycle events and the versioned payload handed to publishers
//!
//! Events are value objects: the engine returns them from `process_frame` and
//! keeps nothing. Downstream transport (MQTT, file, ...) is out of scope here;
//! `EventPayload` is the wire contract those consumers serialize.

use crate::domain::types::{BBox, ReferencePoint, TrackId};
use crate::services::registry::ZoneDefinition;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Payload schema version, bumped on structural changes
pub const PAYLOAD_SCHEMA_VERSION: &str = "1.0";

/// Kind of zone lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoiEventKind {
    Enter,
    Exit,
    DwellThreshold,
}

impl RoiEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoiEventKind::Enter => "roi_enter",
            RoiEventKind::Exit => "roi_exit",
            RoiEventKind::DwellThreshold => "dwell_time",
        }
    }
}

/// A single event produced by the engine for one (track, zone) pair
#[derive(Debug, Clone)]
pub struct RoiEvent {
    pub kind: RoiEventKind,
    pub zone_id: String,
    pub zone_name: String,
    pub aisle_id: String,
    pub camera_id: String,
    pub parent_zone_id: Option<String>,
    pub track_id: TrackId,
    pub confidence: f64,
    pub bbox: BBox,
    pub reference_point: ReferencePoint,
    /// Wall-clock timestamp for external consumers; never used for intervals
    pub timestamp: DateTime<Utc>,
    /// Dwell duration in seconds, 0.0 unless Exit or DwellThreshold
    pub dwell_seconds: f64,
}

impl RoiEvent {
    pub(crate) fn new(
        kind: RoiEventKind,
        zone: &ZoneDefinition,
        track_id: TrackId,
        confidence: f64,
        bbox: BBox,
        timestamp: DateTime<Utc>,
        dwell_seconds: f64,
    ) -> Self {
        Self {
            kind,
            zone_id: zone.id.clone(),
            zone_name: zone.name.clone(),
            aisle_id: zone.aisle_id.clone(),
            camera_id: zone.camera_id.clone(),
            parent_zone_id: zone.parent_id.clone(),
            track_id,
            confidence,
            bbox,
            reference_point: zone.reference_point,
            timestamp,
            dwell_seconds,
        }
    }

    /// Convert to the versioned wire payload
    pub fn payload(&self) -> EventPayload {
        EventPayload {
            schema_version: PAYLOAD_SCHEMA_VERSION,
            timestamp: self.timestamp.to_rfc3339(),
            event_type: self.kind.as_str(),
            camera_id: self.camera_id.clone(),
            roi_id: self.zone_id.clone(),
            roi_name: self.zone_name.clone(),
            aisle_id: self.aisle_id.clone(),
            track_id: self.track_id.0,
            confidence: round_to(self.confidence, 3),
            bbox: self.bbox.into(),
            reference_point: self.reference_point.as_str(),
            dwell_seconds: round_to(self.dwell_seconds, 2),
            parent_roi_id: self.parent_zone_id.clone(),
        }
    }
}

/// Wire payload for one event, serialized as JSON by the publishing side
#[derive(Debug, Clone, Serialize)]
pub struct EventPayload {
    pub schema_version: &'static str,
    /// ISO-8601 UTC timestamp
    pub timestamp: String,
    pub event_type: &'static str,
    pub camera_id: String,
    pub roi_id: String,
    pub roi_name: String,
    pub aisle_id: String,
    pub track_id: i64,
    pub confidence: f64,
    pub bbox: [i32; 4],
    pub reference_point: &'static str,
    pub dwell_seconds: f64,
    pub parent_roi_id: Option<String>,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
