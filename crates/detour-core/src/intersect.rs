//! Route / hazard-boundary intersection predicate.

use crate::models::{GeoPoint, HazardPolygon};
use crate::spatial::segments_intersect;

/// Two points within this many degrees on both axes are treated as the
/// same vertex when deciding whether a ring is already closed.
pub(crate) const RING_CLOSE_TOLERANCE_DEG: f64 = 1e-5;

pub(crate) fn points_coincide(a: &GeoPoint, b: &GeoPoint) -> bool {
    (a.lat - b.lat).abs() < RING_CLOSE_TOLERANCE_DEG
        && (a.lon - b.lon).abs() < RING_CLOSE_TOLERANCE_DEG
}

/// Ring with the first vertex appended if the input is not already closed.
pub(crate) fn closed_ring(ring: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut closed = ring.to_vec();
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if !points_coincide(first, last) {
            closed.push(*first);
        }
    }
    closed
}

/// Route polyline with a single-point route expanded to a zero-length
/// segment, so a point sitting exactly on a boundary still registers.
pub(crate) fn route_polyline(route: &[GeoPoint]) -> Vec<GeoPoint> {
    match route {
        [only] => vec![*only, *only],
        _ => route.to_vec(),
    }
}

/// Whether the route's polyline shares at least one point with the
/// polygon's boundary.
///
/// Touching, crossing and boundary-coincident paths all count. A route
/// fully contained in the polygon interior without touching the boundary
/// does not; this predicate exists to detect edges that must be detoured
/// around. Polygons with fewer than 3 vertices and empty routes are
/// reported as non-intersecting rather than rejected.
pub fn intersects(route: &[GeoPoint], polygon: &HazardPolygon) -> bool {
    if polygon.ring.len() < 3 || route.is_empty() {
        return false;
    }

    let ring = closed_ring(&polygon.ring);
    let path = route_polyline(route);

    for leg in path.windows(2) {
        for edge in ring.windows(2) {
            if segments_intersect(leg[0].xy(), leg[1].xy(), edge[0].xy(), edge[1].xy()) {
                return true;
            }
        }
    }
    false
}
