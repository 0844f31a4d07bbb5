//! Detour construction around a hazard polygon.
//!
//! The pipeline mirrors the re-routing flow: locate where the route enters
//! and leaves the hazard boundary, walk the shorter of the two boundary
//! arcs between those points, thin the arc to a waypoint budget, and push
//! the result outward so road-snapped waypoints stay clear of the hazard.

use crate::error::DetourError;
use crate::intersect::{closed_ring, route_polyline};
use crate::models::{GeoPoint, HazardPolygon};
use crate::spatial::{
    centroid, haversine_distance, point_segment_distance_sq, ring_signed_area, segment_crossing,
};
use serde::{Deserialize, Serialize};

/// Starting Douglas-Peucker tolerance, in degrees.
const INITIAL_TOLERANCE_DEG: f64 = 0.001;
/// Tolerance increment per relaxation round.
const TOLERANCE_STEP_DEG: f64 = 0.001;
/// Tolerance ceiling. If the point budget is still not met here, the last
/// simplification is returned anyway; the budget is soft.
const MAX_TOLERANCE_DEG: f64 = 1.0;

/// Fallback entry/exit when no crossing is found. Callers only locate
/// entry/exit after the intersection test has confirmed a crossing, so
/// this is a defined degenerate result, not an error.
const ORIGIN: GeoPoint = GeoPoint { lat: 0.0, lon: 0.0 };

/// Tunable parameters for detour generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetourConfig {
    /// Outward scale factor applied to the simplified arc.
    pub scale_factor: f64,
    /// Waypoint budget. Counts the entry/exit endpoints that are trimmed
    /// before the sequence is returned, so callers receive at most
    /// `max_waypoints - 2` points.
    pub max_waypoints: usize,
}

impl Default for DetourConfig {
    fn default() -> Self {
        Self {
            scale_factor: 2.0,
            max_waypoints: 10,
        }
    }
}

/// Find the points where the route enters and leaves the hazard boundary.
///
/// Crossings are collected in travel order along the route; the first is
/// the entry, the last the exit. Both default to (0, 0) when no crossing
/// exists.
pub fn locate_entry_exit(route: &[GeoPoint], polygon: &HazardPolygon) -> (GeoPoint, GeoPoint) {
    let mut ring = closed_ring(&polygon.ring);
    normalize_winding(&mut ring);
    let path = route_polyline(route);

    let mut entry = None;
    let mut exit = None;
    for leg in path.windows(2) {
        let mut crossings: Vec<(f64, GeoPoint)> = Vec::new();
        for edge in ring.windows(2) {
            if let Some((x, y, t)) =
                segment_crossing(leg[0].xy(), leg[1].xy(), edge[0].xy(), edge[1].xy())
            {
                crossings.push((t, GeoPoint::from_xy((x, y))));
            }
        }
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (_, point) in crossings {
            if entry.is_none() {
                entry = Some(point);
            }
            exit = Some(point);
        }
    }

    (entry.unwrap_or(ORIGIN), exit.unwrap_or(ORIGIN))
}

/// Rewind a closed ring to counter-clockwise so arc slicing sees a
/// consistent vertex order regardless of how the feed emitted the polygon.
fn normalize_winding(ring: &mut [GeoPoint]) {
    let xy: Vec<(f64, f64)> = ring.iter().map(GeoPoint::xy).collect();
    if ring_signed_area(&xy) < 0.0 {
        ring.reverse();
    }
}

/// Index of the ring segment closest to `point`, ties resolved to the
/// first occurrence in ring order.
fn nearest_segment_index(point: &GeoPoint, ring: &[GeoPoint]) -> Option<usize> {
    let p = point.xy();
    let mut best: Option<(usize, f64)> = None;
    for (i, edge) in ring.windows(2).enumerate() {
        let d = point_segment_distance_sq(p, edge[0].xy(), edge[1].xy());
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Extract the shorter of the two boundary arcs connecting `start` and
/// `end` along the polygon's vertex ring.
///
/// Both candidates are oriented to run from the entry side to the exit
/// side. Lengths are great-circle sums over the vertices; an exact tie
/// keeps the non-wrapping slice.
pub fn shortest_arc(
    start: &GeoPoint,
    end: &GeoPoint,
    ring: &[GeoPoint],
) -> Result<Vec<GeoPoint>, DetourError> {
    let (Some(si), Some(ei)) = (
        nearest_segment_index(start, ring),
        nearest_segment_index(end, ring),
    ) else {
        return Err(DetourError::DegenerateRing {
            vertices: ring.len(),
        });
    };

    let (lo, hi) = (si.min(ei), si.max(ei));
    let mut forward: Vec<GeoPoint> = ring[lo..=hi].to_vec();
    let mut wraparound: Vec<GeoPoint> = ring[hi..].iter().chain(&ring[..=lo]).copied().collect();
    if si > ei {
        forward.reverse();
    } else {
        wraparound.reverse();
    }

    if arc_length_m(&forward) <= arc_length_m(&wraparound) {
        Ok(forward)
    } else {
        Ok(wraparound)
    }
}

fn arc_length_m(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon))
        .sum()
}

/// Reduce a point sequence to at most `max_points` vertices.
///
/// Sequences already within budget are returned unchanged. Otherwise the
/// original sequence is Douglas-Peucker simplified under an increasing
/// tolerance until the count fits or the tolerance ceiling is reached;
/// the last computed result is returned either way.
pub fn simplify(points: &[GeoPoint], max_points: usize) -> Result<Vec<GeoPoint>, DetourError> {
    let target = max_points.max(2);
    if points.len() <= target {
        return Ok(points.to_vec());
    }

    let xy: Vec<(f64, f64)> = points.iter().map(GeoPoint::xy).collect();
    let mut tolerance = INITIAL_TOLERANCE_DEG;
    let mut simplified = douglas_peucker(&xy, tolerance);
    while simplified.len() > target && tolerance < MAX_TOLERANCE_DEG {
        tolerance += TOLERANCE_STEP_DEG;
        simplified = douglas_peucker(&xy, tolerance);
    }

    if simplified.len() < 2 {
        return Err(DetourError::InvalidSimplification {
            points: simplified.len(),
        });
    }
    Ok(simplified.into_iter().map(GeoPoint::from_xy).collect())
}

fn douglas_peucker(points: &[(f64, f64)], tolerance: f64) -> Vec<(f64, f64)> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut spans = vec![(0usize, points.len() - 1)];
    while let Some((first, last)) = spans.pop() {
        let mut max_dist = 0.0;
        let mut index = first;
        for i in first + 1..last {
            let d = point_segment_distance_sq(points[i], points[first], points[last]).sqrt();
            if d > max_dist {
                max_dist = d;
                index = i;
            }
        }
        if max_dist > tolerance {
            keep[index] = true;
            spans.push((first, index));
            spans.push((index, last));
        }
    }

    points
        .iter()
        .zip(&keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}

/// Push waypoints away from the hazard by scaling each point's offset from
/// the shared centroid, then drop the first and last points, which
/// duplicate the entry/exit the caller already holds.
///
/// Simplified boundary points sit exactly on the hazard edge; routing
/// services snapping them to the nearest road can otherwise re-enter the
/// hazard.
pub fn scale_outward(points: &[GeoPoint], factor: f64) -> Vec<GeoPoint> {
    let scaled = scale_about_centroid(points, factor);
    if scaled.len() <= 2 {
        return Vec::new();
    }
    scaled[1..scaled.len() - 1].to_vec()
}

pub(crate) fn scale_about_centroid(points: &[GeoPoint], factor: f64) -> Vec<GeoPoint> {
    let xy: Vec<(f64, f64)> = points.iter().map(GeoPoint::xy).collect();
    let Some((cx, cy)) = centroid(&xy) else {
        return Vec::new();
    };
    xy.into_iter()
        .map(|(x, y)| GeoPoint::from_xy((cx + (x - cx) * factor, cy + (y - cy) * factor)))
        .collect()
}

/// Compose the full pipeline with default parameters. Returns an empty
/// sequence when no viable detour exists.
pub fn compute_detour_waypoints(route: &[GeoPoint], polygon: &HazardPolygon) -> Vec<GeoPoint> {
    compute_detour_waypoints_with(route, polygon, &DetourConfig::default())
}

/// Compose the full pipeline: entry/exit location, boundary arc selection,
/// simplification and outward scaling.
pub fn compute_detour_waypoints_with(
    route: &[GeoPoint],
    polygon: &HazardPolygon,
    config: &DetourConfig,
) -> Vec<GeoPoint> {
    match try_compute_detour(route, polygon, config) {
        Ok(waypoints) => waypoints,
        Err(err) => {
            tracing::warn!(error = %err, "no viable detour, leaving route as-is");
            Vec::new()
        }
    }
}

/// Result-returning form of [`compute_detour_waypoints_with`] for callers
/// that distinguish "no detour needed" from "detour construction failed".
pub fn try_compute_detour(
    route: &[GeoPoint],
    polygon: &HazardPolygon,
    config: &DetourConfig,
) -> Result<Vec<GeoPoint>, DetourError> {
    let (entry, exit) = locate_entry_exit(route, polygon);
    let arc = shortest_arc(&entry, &exit, &polygon.ring)?;
    let simplified = simplify(&arc, config.max_waypoints)?;
    Ok(scale_outward(&simplified, config.scale_factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    fn approx(a: &GeoPoint, b: &GeoPoint) -> bool {
        (a.lat - b.lat).abs() < 1e-9 && (a.lon - b.lon).abs() < 1e-9
    }

    fn box_polygon() -> HazardPolygon {
        HazardPolygon::new(
            vec![
                GeoPoint::new(1.0, 0.0),
                GeoPoint::new(1.0, 1.0),
                GeoPoint::new(1.5, 1.0),
                GeoPoint::new(1.5, 0.0),
            ],
            Severity::Moderate,
        )
    }

    #[test]
    fn entry_exit_ordered_along_route() {
        let route = [GeoPoint::new(0.0, 0.5), GeoPoint::new(2.0, 0.5)];
        let (entry, exit) = locate_entry_exit(&route, &box_polygon());
        assert!(approx(&entry, &GeoPoint::new(1.0, 0.5)), "entry {entry:?}");
        assert!(approx(&exit, &GeoPoint::new(1.5, 0.5)), "exit {exit:?}");
    }

    #[test]
    fn entry_exit_respects_travel_direction() {
        // Same geometry, route reversed: entry and exit swap.
        let route = [GeoPoint::new(2.0, 0.5), GeoPoint::new(0.0, 0.5)];
        let (entry, exit) = locate_entry_exit(&route, &box_polygon());
        assert!(approx(&entry, &GeoPoint::new(1.5, 0.5)), "entry {entry:?}");
        assert!(approx(&exit, &GeoPoint::new(1.0, 0.5)), "exit {exit:?}");
    }

    #[test]
    fn entry_exit_falls_back_to_origin() {
        let route = [GeoPoint::new(5.0, 5.0), GeoPoint::new(6.0, 5.0)];
        let (entry, exit) = locate_entry_exit(&route, &box_polygon());
        assert!(approx(&entry, &ORIGIN));
        assert!(approx(&exit, &ORIGIN));
    }

    #[test]
    fn shortest_arc_picks_clearly_shorter_side() {
        let ring = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ];
        // Entry on the first edge, exit on the second: one vertex apart
        // forward, three vertices the long way around.
        let start = GeoPoint::new(0.0, 0.5);
        let end = GeoPoint::new(0.5, 1.0);
        let arc = shortest_arc(&start, &end, &ring).unwrap();
        assert_eq!(arc.len(), 2);
        assert!(approx(&arc[0], &ring[0]));
        assert!(approx(&arc[1], &ring[1]));
    }

    #[test]
    fn opposite_midpoints_split_ring_in_half() {
        // Square symmetric about the equator; entry/exit on opposite edge
        // midpoints. Whichever candidate wins, it must span half the
        // perimeter and connect the same end vertices.
        let ring = vec![
            GeoPoint::new(-0.5, 0.0),
            GeoPoint::new(-0.5, 1.0),
            GeoPoint::new(0.5, 1.0),
            GeoPoint::new(0.5, 0.0),
        ];
        let start = GeoPoint::new(-0.5, 0.5);
        let end = GeoPoint::new(0.5, 0.5);
        let arc = shortest_arc(&start, &end, &ring).unwrap();

        let mut closed = ring.clone();
        closed.push(ring[0]);
        let perimeter = arc_length_m(&closed);
        let length = arc_length_m(&arc);
        assert_eq!(arc.len(), 3);
        assert!(approx(&arc[0], &ring[0]));
        assert!(approx(&arc[2], &ring[2]));
        assert!(
            (length - perimeter / 2.0).abs() < 1_000.0,
            "arc {length}m vs half perimeter {}m",
            perimeter / 2.0
        );
    }

    #[test]
    fn shortest_arc_reversed_endpoints_runs_entry_to_exit() {
        let ring = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ];
        let start = GeoPoint::new(0.5, 1.0);
        let end = GeoPoint::new(0.0, 0.5);
        let arc = shortest_arc(&start, &end, &ring).unwrap();
        assert_eq!(arc.len(), 2);
        assert!(approx(&arc[0], &ring[1]));
        assert!(approx(&arc[1], &ring[0]));
    }

    #[test]
    fn degenerate_ring_is_an_error() {
        let ring = vec![GeoPoint::new(0.0, 0.0)];
        let err = shortest_arc(&GeoPoint::new(0.0, 0.0), &GeoPoint::new(1.0, 1.0), &ring)
            .unwrap_err();
        assert_eq!(err, DetourError::DegenerateRing { vertices: 1 });
    }

    #[test]
    fn simplify_is_identity_under_budget() {
        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.5, 0.1),
            GeoPoint::new(1.0, 0.0),
        ];
        let simplified = simplify(&points, 10).unwrap();
        assert_eq!(simplified, points);
    }

    #[test]
    fn simplify_meets_budget_on_dense_arc() {
        // Half circle of radius 1 degree, 60 samples.
        let points: Vec<GeoPoint> = (0..=60)
            .map(|i| {
                let theta = std::f64::consts::PI * i as f64 / 60.0;
                GeoPoint::new(theta.sin(), theta.cos())
            })
            .collect();
        let simplified = simplify(&points, 10).unwrap();
        assert!(simplified.len() <= 10, "got {} points", simplified.len());
        assert!(simplified.len() >= 2);
        assert!(approx(&simplified[0], &points[0]));
        assert!(approx(simplified.last().unwrap(), points.last().unwrap()));
    }

    #[test]
    fn simplify_never_increases_count() {
        let points: Vec<GeoPoint> = (0..40)
            .map(|i| GeoPoint::new(i as f64 * 0.01, (i % 5) as f64 * 0.002))
            .collect();
        for budget in [2usize, 5, 15, 100] {
            let simplified = simplify(&points, budget).unwrap();
            assert!(simplified.len() <= points.len());
        }
    }

    #[test]
    fn scaling_preserves_centroid_before_trim() {
        let points = vec![
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(1.5, 0.0),
            GeoPoint::new(1.5, 1.0),
            GeoPoint::new(1.2, 0.7),
        ];
        for factor in [1.5, 2.0, 3.0] {
            let scaled = scale_about_centroid(&points, factor);
            let before = centroid(&points.iter().map(GeoPoint::xy).collect::<Vec<_>>()).unwrap();
            let after = centroid(&scaled.iter().map(GeoPoint::xy).collect::<Vec<_>>()).unwrap();
            assert!((before.0 - after.0).abs() < 1e-9);
            assert!((before.1 - after.1).abs() < 1e-9);
        }
    }

    #[test]
    fn scale_outward_trims_entry_and_exit() {
        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(0.0, 1.0),
        ];
        let waypoints = scale_outward(&points, 2.0);
        assert_eq!(waypoints.len(), 2);

        // Offsets from the centroid doubled: (1,0) is 0.5 up-left of the
        // centroid (0.5, 0.5) in (lat, lon) terms.
        assert!(approx(&waypoints[0], &GeoPoint::new(1.5, -0.5)));
        assert!(approx(&waypoints[1], &GeoPoint::new(1.5, 1.5)));
    }

    #[test]
    fn scale_outward_short_inputs_give_no_waypoints() {
        assert!(scale_outward(&[], 2.0).is_empty());
        assert!(scale_outward(&[GeoPoint::new(1.0, 1.0)], 2.0).is_empty());
        let pair = [GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)];
        assert!(scale_outward(&pair, 2.0).is_empty());
    }

    #[test]
    fn detour_waypoints_clear_the_hazard() {
        let route = [GeoPoint::new(0.0, 0.5), GeoPoint::new(2.0, 0.5)];
        let polygon = box_polygon();
        let waypoints = compute_detour_waypoints(&route, &polygon);
        assert!(!waypoints.is_empty());
        for waypoint in &waypoints {
            assert!(
                !polygon.bbox.contains(waypoint),
                "waypoint {waypoint:?} still inside hazard bbox"
            );
        }
    }
}
