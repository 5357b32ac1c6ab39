//! Shared types for the ROI engine

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Newtype wrapper for track IDs to provide type safety
///
/// Negative IDs are the tracker's "untracked" sentinel: the detection has no
/// stable identity yet and never participates in zone state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TrackId(pub i64);

impl TrackId {
    #[inline]
    pub fn is_tracked(self) -> bool {
        self.0 >= 0
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis-aligned bounding box in pixel coordinates, (x1, y1) top-left
///
/// Serialized as a `[x1, y1, x2, y2]` array on both the detection input and
/// the event payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<[i32; 4]> for BBox {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BBox> for [i32; 4] {
    fn from(b: BBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One detection record from the upstream detector/tracker, per frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub track_id: TrackId,
    pub label: String,
    pub confidence: f64,
    pub bbox: BBox,
}

impl Detection {
    pub fn new(track_id: i64, label: &str, confidence: f64, bbox: BBox) -> Self {
        Self { track_id: TrackId(track_id), label: label.to_string(), confidence, bbox }
    }
}

/// Which point of the bounding box represents the object for containment
///
/// Bottom-center suits ground vehicles (wheels touch the floor plane);
/// top-center suits steep overhead camera angles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePoint {
    #[default]
    BottomCenter,
    Centroid,
    TopCenter,
}

impl ReferencePoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferencePoint::BottomCenter => "bottom_center",
            ReferencePoint::Centroid => "centroid",
            ReferencePoint::TopCenter => "top_center",
        }
    }
}

/// Unrecognized reference-point string; callers fall back to
/// [`ReferencePoint::BottomCenter`] with a warning rather than failing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReferencePoint(pub String);

impl std::fmt::Display for UnknownReferencePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown reference point '{}'", self.0)
    }
}

impl std::error::Error for UnknownReferencePoint {}

impl FromStr for ReferencePoint {
    type Err = UnknownReferencePoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bottom_center" => Ok(ReferencePoint::BottomCenter),
            "centroid" => Ok(ReferencePoint::Centroid),
            "top_center" => Ok(ReferencePoint::TopCenter),
            other => Err(UnknownReferencePoint(other.to_string())),
        }
    }
}
