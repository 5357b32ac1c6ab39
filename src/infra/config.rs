//! Zones document loading from JSON files
//!
//! The document carries a `zones` array (legacy alias `rois`); each entry is
//! kept as a raw JSON value so that one malformed entry can be skipped without
//! failing the batch. A missing or unreadable file is not fatal: the engine
//! simply runs with zero zones and never emits events.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Top-level zones document
#[derive(Debug, Default, Deserialize)]
pub struct ZonesDocument {
    #[serde(default, alias = "rois")]
    pub zones: Vec<serde_json::Value>,
}

impl ZonesDocument {
    /// Parse a document from a JSON string
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        serde_json::from_str(content).context("failed to parse zones document")
    }

    /// Load a document from a file, degrading to an empty document
    ///
    /// Missing, unreadable, or unparseable sources are logged and yield zero
    /// zones rather than an error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "zones_file_unreadable");
                return Self::default();
            }
        };
        match Self::parse(&content) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "zones_file_malformed");
                Self::default()
            }
        }
    }
}

/// One zone entry as it appears in the document
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneEntry {
    pub id: String,
    pub name: String,
    pub aisle_id: String,
    pub camera_id: String,
    /// Polygon vertices in absolute pixel coordinates
    pub points: Vec<[f64; 2]>,
    #[serde(default)]
    pub reference_point: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    /// Overlay color, BGR; anything but a 3-element array falls back to green
    #[serde(default)]
    pub color: Option<Vec<u8>>,
    /// Dwell threshold in seconds; absent or <= 0 disables dwell events
    #[serde(default)]
    pub dwell_threshold_sec: f64,
}

fn default_is_active() -> bool {
    true
}

pub const DEFAULT_COLOR: [u8; 3] = [0, 255, 0];

impl ZoneEntry {
    pub fn color_or_default(&self) -> [u8; 3] {
        match self.color.as_deref() {
            Some([b, g, r]) => [*b, *g, *r],
            _ => DEFAULT_COLOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_zones_document() {
        let doc = ZonesDocument::parse(
            r#"{"zones": [{"id": "Z1", "name": "Aisle 1", "aisle_id": "A1",
                "camera_id": "CAM_1", "points": [[0,0],[10,0],[10,10]]}]}"#,
        )
        .unwrap();
        assert_eq!(doc.zones.len(), 1);
    }

    #[test]
    fn test_rois_alias_accepted() {
        let doc = ZonesDocument::parse(r#"{"rois": [{"id": "Z1"}]}"#).unwrap();
        assert_eq!(doc.zones.len(), 1);
    }

    #[test]
    fn test_entry_defaults() {
        let entry: ZoneEntry = serde_json::from_str(
            r#"{"id": "Z1", "name": "n", "aisle_id": "a", "camera_id": "c",
                "points": [[0,0],[1,0],[1,1]]}"#,
        )
        .unwrap();
        assert!(entry.is_active);
        assert!(entry.parent_id.is_none());
        assert!(entry.reference_point.is_none());
        assert_eq!(entry.color_or_default(), DEFAULT_COLOR);
        assert_eq!(entry.dwell_threshold_sec, 0.0);
    }

    #[test]
    fn test_wrong_length_color_falls_back() {
        let entry: ZoneEntry = serde_json::from_str(
            r#"{"id": "Z1", "name": "n", "aisle_id": "a", "camera_id": "c",
                "points": [[0,0],[1,0],[1,1]], "color": [1, 2]}"#,
        )
        .unwrap();
        assert_eq!(entry.color_or_default(), DEFAULT_COLOR);
    }

    #[test]
    fn test_missing_file_yields_empty_document() {
        let doc = ZonesDocument::from_file("/nonexistent/zones.json");
        assert!(doc.zones.is_empty());
    }
}
