//! Zone definitions and the per-camera zone registry
//!
//! Definitions are immutable after load apart from the `is_active` flag.
//! Loading is entry-tolerant: a malformed entry is logged and skipped, the
//! rest of the document still loads, and the summary reports both counts.

use crate::domain::geometry::{self, ZoneShapeError};
use crate::domain::types::ReferencePoint;
use crate::infra::config::{ZoneEntry, ZonesDocument};
use geo::{Contains, MultiPolygon, Point};
use rustc_hash::FxHashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// A configured polygonal region of interest tied to a camera and aisle
#[derive(Debug, Clone)]
pub struct ZoneDefinition {
    pub id: String,
    pub name: String,
    pub aisle_id: String,
    pub camera_id: String,
    /// Raw vertex list in pixel coordinates, kept for overlay renderers
    pub points: Vec<(f64, f64)>,
    pub reference_point: ReferencePoint,
    /// Parent zone for grouping/reporting; never validated to exist
    pub parent_id: Option<String>,
    pub is_active: bool,
    /// Overlay color, BGR; cosmetic only
    pub color: [u8; 3],
    polygon: MultiPolygon<f64>,
}

impl ZoneDefinition {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: &str,
        name: &str,
        aisle_id: &str,
        camera_id: &str,
        points: Vec<(f64, f64)>,
        reference_point: ReferencePoint,
        parent_id: Option<String>,
        is_active: bool,
        color: [u8; 3],
    ) -> Result<Self, ZoneShapeError> {
        let polygon = geometry::prepare_polygon(&points)?;
        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            aisle_id: aisle_id.to_string(),
            camera_id: camera_id.to_string(),
            points,
            reference_point,
            parent_id,
            is_active,
            color,
            polygon,
        })
    }

    /// Point-in-polygon test; boundary behavior follows the geometry
    /// primitive's convention
    pub fn contains(&self, point: Point<f64>) -> bool {
        self.polygon.contains(&point)
    }

    pub fn polygon(&self) -> &MultiPolygon<f64> {
        &self.polygon
    }
}

/// Result of loading a zones document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// Entries successfully added to the registry
    pub loaded: usize,
    /// Entries seen in the document, including rejected ones
    pub total: usize,
}

/// Registry of zone definitions and their dwell thresholds
#[derive(Default)]
pub struct ZoneRegistry {
    zones: FxHashMap<String, ZoneDefinition>,
    dwell_thresholds: FxHashMap<String, Duration>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all entries from a document, skipping malformed ones
    pub fn load(&mut self, document: &ZonesDocument) -> LoadSummary {
        let total = document.zones.len();
        let mut loaded = 0;

        for raw in &document.zones {
            let entry: ZoneEntry = match serde_json::from_value(raw.clone()) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "zone_entry_malformed");
                    continue;
                }
            };

            let reference_point = match entry.reference_point.as_deref() {
                None => ReferencePoint::default(),
                Some(s) => s.parse().unwrap_or_else(|e| {
                    warn!(zone_id = %entry.id, error = %e, "reference_point_fallback");
                    ReferencePoint::BottomCenter
                }),
            };

            let points: Vec<(f64, f64)> = entry.points.iter().map(|&[x, y]| (x, y)).collect();

            let zone = match ZoneDefinition::new(
                &entry.id,
                &entry.name,
                &entry.aisle_id,
                &entry.camera_id,
                points,
                reference_point,
                entry.parent_id.clone(),
                entry.is_active,
                entry.color_or_default(),
            ) {
                Ok(zone) => zone,
                Err(e) => {
                    warn!(zone_id = %entry.id, error = %e, "zone_entry_rejected");
                    continue;
                }
            };

            let threshold = if entry.dwell_threshold_sec > 0.0 {
                Some(Duration::from_secs_f64(entry.dwell_threshold_sec))
            } else {
                None
            };

            info!(
                zone_id = %zone.id,
                name = %zone.name,
                aisle_id = %zone.aisle_id,
                camera_id = %zone.camera_id,
                vertices = %zone.points.len(),
                reference_point = %zone.reference_point.as_str(),
                parent_id = %zone.parent_id.as_deref().unwrap_or("none"),
                dwell_threshold_sec = %entry.dwell_threshold_sec,
                "zone_loaded"
            );

            self.add(zone, threshold);
            loaded += 1;
        }

        info!(loaded = %loaded, total = %total, "zones_load_complete");
        LoadSummary { loaded, total }
    }

    /// Load from a JSON file; a missing file loads zero zones
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> LoadSummary {
        let document = ZonesDocument::from_file(path);
        self.load(&document)
    }

    /// Add a zone programmatically, replacing any zone with the same id
    pub fn add(&mut self, zone: ZoneDefinition, dwell_threshold: Option<Duration>) {
        match dwell_threshold.filter(|d| !d.is_zero()) {
            Some(threshold) => {
                self.dwell_thresholds.insert(zone.id.clone(), threshold);
            }
            None => {
                self.dwell_thresholds.remove(&zone.id);
            }
        }
        self.zones.insert(zone.id.clone(), zone);
    }

    pub fn get(&self, zone_id: &str) -> Option<&ZoneDefinition> {
        self.zones.get(zone_id)
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Active zones in registry iteration order (stable for a given state)
    pub fn active_zones(&self) -> impl Iterator<Item = &ZoneDefinition> {
        self.zones.values().filter(|z| z.is_active)
    }

    /// Direct children of a parent zone, never grandchildren
    pub fn children_of(&self, parent_id: &str) -> Vec<&ZoneDefinition> {
        self.zones.values().filter(|z| z.parent_id.as_deref() == Some(parent_id)).collect()
    }

    pub fn dwell_threshold(&self, zone_id: &str) -> Option<Duration> {
        self.dwell_thresholds.get(zone_id).copied()
    }

    /// Flip a zone's active flag; returns false if the zone is unknown
    pub fn set_active(&mut self, zone_id: &str, active: bool) -> bool {
        match self.zones.get_mut(zone_id) {
            Some(zone) => {
                zone.is_active = active;
                true
            }
            None => false,
        }
    }

    /// Remove all zones and thresholds
    pub fn clear(&mut self) {
        self.zones.clear();
        self.dwell_thresholds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_zone(id: &str, parent: Option<&str>, active: bool) -> ZoneDefinition {
        ZoneDefinition::new(
            id,
            id,
            "A-01",
            "CAM_01",
            vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            ReferencePoint::BottomCenter,
            parent.map(str::to_string),
            active,
            [0, 255, 0],
        )
        .unwrap()
    }

    #[test]
    fn test_load_counts_well_formed_and_malformed() {
        let doc = ZonesDocument::parse(
            r#"{"zones": [
                {"id": "Z1", "name": "Zone 1", "aisle_id": "A1", "camera_id": "C1",
                 "points": [[0,0],[10,0],[10,10],[0,10]], "dwell_threshold_sec": 2.0},
                {"id": "Z2", "name": "Zone 2", "aisle_id": "A1", "camera_id": "C1",
                 "points": [[0,0],[10,0]]},
                {"name": "missing id", "aisle_id": "A1", "camera_id": "C1",
                 "points": [[0,0],[10,0],[10,10]]},
                {"id": "Z3", "name": "Zone 3", "aisle_id": "A2", "camera_id": "C1",
                 "points": [[20,0],[30,0],[30,10],[20,10]]}
            ]}"#,
        )
        .unwrap();

        let mut registry = ZoneRegistry::new();
        let summary = registry.load(&doc);

        // Z2 has too few vertices, the third entry lacks a required field
        assert_eq!(summary, LoadSummary { loaded: 2, total: 4 });
        assert!(registry.get("Z1").is_some());
        assert!(registry.get("Z2").is_none());
        assert!(registry.get("Z3").is_some());
        assert_eq!(registry.dwell_threshold("Z1"), Some(Duration::from_secs(2)));
        assert_eq!(registry.dwell_threshold("Z3"), None);
    }

    #[test]
    fn test_unknown_reference_point_falls_back() {
        let doc = ZonesDocument::parse(
            r#"{"zones": [
                {"id": "Z1", "name": "Zone 1", "aisle_id": "A1", "camera_id": "C1",
                 "points": [[0,0],[10,0],[10,10],[0,10]], "reference_point": "sideways"}
            ]}"#,
        )
        .unwrap();

        let mut registry = ZoneRegistry::new();
        let summary = registry.load(&doc);

        // Fallback, not a rejection
        assert_eq!(summary.loaded, 1);
        assert_eq!(registry.get("Z1").unwrap().reference_point, ReferencePoint::BottomCenter);
    }

    #[test]
    fn test_self_intersecting_polygon_is_repaired() {
        let doc = ZonesDocument::parse(
            r#"{"zones": [
                {"id": "Z1", "name": "Bowtie", "aisle_id": "A1", "camera_id": "C1",
                 "points": [[0,0],[10,10],[10,0],[0,10]]}
            ]}"#,
        )
        .unwrap();

        let mut registry = ZoneRegistry::new();
        assert_eq!(registry.load(&doc).loaded, 1);
        assert!(registry.get("Z1").unwrap().contains(Point::new(7.0, 5.0)));
    }

    #[test]
    fn test_children_of_direct_only() {
        let mut registry = ZoneRegistry::new();
        registry.add(square_zone("Z1", None, false), None);
        registry.add(square_zone("Z2", Some("Z1"), true), None);
        registry.add(square_zone("Z3", Some("Z1"), true), None);
        registry.add(square_zone("Z4", Some("Z2"), true), None);

        // Direct children only, regardless of the parent's active flag
        let mut children: Vec<&str> =
            registry.children_of("Z1").iter().map(|z| z.id.as_str()).collect();
        children.sort_unstable();
        assert_eq!(children, vec!["Z2", "Z3"]);
        assert_eq!(registry.children_of("Z4").len(), 0);
    }

    #[test]
    fn test_orphan_parent_reference_is_permitted() {
        let mut registry = ZoneRegistry::new();
        registry.add(square_zone("Z1", Some("NO_SUCH_ZONE"), true), None);
        assert_eq!(registry.zone_count(), 1);
        assert_eq!(registry.children_of("NO_SUCH_ZONE").len(), 1);
    }

    #[test]
    fn test_active_zones_excludes_inactive() {
        let mut registry = ZoneRegistry::new();
        registry.add(square_zone("Z1", None, true), None);
        registry.add(square_zone("Z2", None, false), None);

        let active: Vec<&str> = registry.active_zones().map(|z| z.id.as_str()).collect();
        assert_eq!(active, vec!["Z1"]);

        assert!(registry.set_active("Z2", true));
        assert_eq!(registry.active_zones().count(), 2);
        assert!(!registry.set_active("Z9", true));
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut registry = ZoneRegistry::new();
        registry.add(square_zone("Z1", None, true), Some(Duration::from_secs(5)));
        registry.clear();
        assert_eq!(registry.zone_count(), 0);
        assert_eq!(registry.dwell_threshold("Z1"), None);
    }

    #[test]
    fn test_zero_threshold_disables_dwell() {
        let mut registry = ZoneRegistry::new();
        registry.add(square_zone("Z1", None, true), Some(Duration::ZERO));
        assert_eq!(registry.dwell_threshold("Z1"), None);
    }
}
