//! Planar and spherical geometry primitives for the detour pipeline.
//!
//! Planar functions operate on (x, y) = (longitude, latitude) tuples;
//! conversion from `GeoPoint` happens at call sites via `GeoPoint::xy()`.
//! Tolerances are in degrees (1e-9 degrees is roughly 0.1 mm).

/// Epsilon for orientation and inclusion tests on degree-scale coordinates.
const EPS_DEG: f64 = 1e-9;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

fn orient(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> f64 {
    (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
}

fn within(a: f64, b: f64, value: f64) -> bool {
    let min = a.min(b) - EPS_DEG;
    let max = a.max(b) + EPS_DEG;
    value >= min && value <= max
}

fn on_segment(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> bool {
    within(p.0, q.0, r.0) && within(p.1, q.1, r.1)
}

/// Whether segments A and B share at least one point.
///
/// Touching endpoints, collinear overlap and zero-length segments all
/// count as intersecting.
pub(crate) fn segments_intersect(
    a1: (f64, f64),
    a2: (f64, f64),
    b1: (f64, f64),
    b2: (f64, f64),
) -> bool {
    let o1 = orient(a1, a2, b1);
    let o2 = orient(a1, a2, b2);
    let o3 = orient(b1, b2, a1);
    let o4 = orient(b1, b2, a2);

    if o1.abs() <= EPS_DEG && on_segment(a1, a2, b1) {
        return true;
    }
    if o2.abs() <= EPS_DEG && on_segment(a1, a2, b2) {
        return true;
    }
    if o3.abs() <= EPS_DEG && on_segment(b1, b2, a1) {
        return true;
    }
    if o4.abs() <= EPS_DEG && on_segment(b1, b2, a2) {
        return true;
    }

    let a_crosses = (o1 > EPS_DEG && o2 < -EPS_DEG) || (o1 < -EPS_DEG && o2 > EPS_DEG);
    let b_crosses = (o3 > EPS_DEG && o4 < -EPS_DEG) || (o3 < -EPS_DEG && o4 > EPS_DEG);
    a_crosses && b_crosses
}

/// Crossing point of segments A and B, if one exists.
///
/// Returns (x, y, t) where t is the parameter along A, so crossings on the
/// same route segment can be ordered by travel direction. Parallel and
/// collinear pairs return `None`; the boolean intersection test is the one
/// that accounts for overlap.
pub(crate) fn segment_crossing(
    a1: (f64, f64),
    a2: (f64, f64),
    b1: (f64, f64),
    b2: (f64, f64),
) -> Option<(f64, f64, f64)> {
    let d1 = (a2.0 - a1.0, a2.1 - a1.1);
    let d2 = (b2.0 - b1.0, b2.1 - b1.1);
    let denom = d1.0 * d2.1 - d1.1 * d2.0;
    if denom.abs() < 1e-12 {
        return None;
    }

    let w = (b1.0 - a1.0, b1.1 - a1.1);
    let t = (w.0 * d2.1 - w.1 * d2.0) / denom;
    let u = (w.0 * d1.1 - w.1 * d1.0) / denom;
    if !(-EPS_DEG..=1.0 + EPS_DEG).contains(&t) || !(-EPS_DEG..=1.0 + EPS_DEG).contains(&u) {
        return None;
    }

    let t = t.clamp(0.0, 1.0);
    Some((a1.0 + t * d1.0, a1.1 + t * d1.1, t))
}

/// Squared distance from a point to a segment, with the projection
/// parameter clamped to the segment.
pub(crate) fn point_segment_distance_sq(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        let (ex, ey) = (p.0 - a.0, p.1 - a.1);
        return ex * ex + ey * ey;
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
    let (ex, ey) = (p.0 - (a.0 + t * dx), p.1 - (a.1 + t * dy));
    ex * ex + ey * ey
}

/// Shoelace signed area of a closed ring (first point equals last).
/// Positive for counter-clockwise winding in (x, y).
pub(crate) fn ring_signed_area(ring: &[(f64, f64)]) -> f64 {
    let mut sum = 0.0;
    for pair in ring.windows(2) {
        sum += pair[0].0 * pair[1].1 - pair[1].0 * pair[0].1;
    }
    sum / 2.0
}

/// Arithmetic-mean centroid of a point set.
pub(crate) fn centroid(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.0, sy + p.1));
    let n = points.len() as f64;
    Some((sx / n, sy / n))
}
