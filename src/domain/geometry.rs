//! Reference-point math and polygon preparation
//!
//! Zones are simple polygons in the camera's pixel plane. A self-intersecting
//! vertex list is repaired with a zero-width boolean self-union before being
//! accepted; a shape that is still invalid afterwards is rejected.

use crate::domain::types::{BBox, ReferencePoint};
use geo::{BooleanOps, Coord, LineString, MultiPolygon, Point, Polygon, Validation};

/// Compute the representative point of a bounding box under a strategy
///
/// Pure and deterministic: bottom-center is the midpoint of the x-span at
/// max-y, top-center at min-y, centroid the bbox center.
pub fn reference_point(bbox: &BBox, strategy: ReferencePoint) -> Point<f64> {
    let cx = f64::from(bbox.x1 + bbox.x2) / 2.0;
    match strategy {
        ReferencePoint::BottomCenter => Point::new(cx, f64::from(bbox.y2)),
        ReferencePoint::TopCenter => Point::new(cx, f64::from(bbox.y1)),
        ReferencePoint::Centroid => {
            let cy = f64::from(bbox.y1 + bbox.y2) / 2.0;
            Point::new(cx, cy)
        }
    }
}

/// Validation failure for a zone's vertex list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneShapeError {
    /// Fewer than the 3 vertices needed to form a polygon
    TooFewVertices(usize),
    /// Self-union repair still produced an invalid or empty shape
    RepairFailed,
}

impl std::fmt::Display for ZoneShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneShapeError::TooFewVertices(n) => {
                write!(f, "polygon needs at least 3 vertices, got {}", n)
            }
            ZoneShapeError::RepairFailed => write!(f, "polygon invalid after zero-width repair"),
        }
    }
}

impl std::error::Error for ZoneShapeError {}

/// Build a containment-ready polygon from a zone's vertex list
///
/// Returns a `MultiPolygon` because repairing a bow-tie shape can split it
/// into several simple parts.
pub fn prepare_polygon(points: &[(f64, f64)]) -> Result<MultiPolygon<f64>, ZoneShapeError> {
    if points.len() < 3 {
        return Err(ZoneShapeError::TooFewVertices(points.len()));
    }

    let ring: LineString<f64> = points.iter().map(|&(x, y)| Coord { x, y }).collect();
    let polygon = Polygon::new(ring, vec![]);

    if polygon.is_valid() {
        return Ok(MultiPolygon::new(vec![polygon]));
    }

    // Self-union resolves self-intersections the same way Shapely's buffer(0)
    // does; the input polygon itself stays untouched.
    let repaired = polygon.union(&polygon);
    if repaired.0.is_empty() || !repaired.is_valid() {
        return Err(ZoneShapeError::RepairFailed);
    }
    Ok(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Contains;

    #[test]
    fn test_reference_point_bottom_center() {
        let bbox = BBox::new(10, 20, 30, 60);
        let p = reference_point(&bbox, ReferencePoint::BottomCenter);
        assert_eq!((p.x(), p.y()), (20.0, 60.0));
    }

    #[test]
    fn test_reference_point_top_center() {
        let bbox = BBox::new(10, 20, 30, 60);
        let p = reference_point(&bbox, ReferencePoint::TopCenter);
        assert_eq!((p.x(), p.y()), (20.0, 20.0));
    }

    #[test]
    fn test_reference_point_centroid() {
        let bbox = BBox::new(10, 20, 30, 60);
        let p = reference_point(&bbox, ReferencePoint::Centroid);
        assert_eq!((p.x(), p.y()), (20.0, 40.0));
    }

    #[test]
    fn test_prepare_polygon_square() {
        let poly =
            prepare_polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]).unwrap();
        assert!(poly.contains(&Point::new(5.0, 5.0)));
        assert!(!poly.contains(&Point::new(15.0, 5.0)));
    }

    #[test]
    fn test_prepare_polygon_too_few_vertices() {
        let err = prepare_polygon(&[(0.0, 0.0), (10.0, 0.0)]).unwrap_err();
        assert_eq!(err, ZoneShapeError::TooFewVertices(2));
    }

    #[test]
    fn test_prepare_polygon_repairs_bowtie() {
        // Crossing vertex order: (0,0)-(10,10)-(10,0)-(0,10) self-intersects
        let poly =
            prepare_polygon(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]).unwrap();
        // After repair the two triangular lobes are still covered
        assert!(poly.contains(&Point::new(7.0, 5.0)));
        assert!(poly.contains(&Point::new(3.0, 5.0)));
    }
}
