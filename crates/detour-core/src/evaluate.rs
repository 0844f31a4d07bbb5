//! First-match hazard evaluation over an ordered set of hazard groups.

use crate::detour::{compute_detour_waypoints_with, DetourConfig};
use crate::intersect::intersects;
use crate::models::{GeoPoint, HazardGroup, Severity};
use serde::{Deserialize, Serialize};

/// Outcome of evaluating a route against a collection of hazard groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardMatch {
    /// Position of the matched group in the evaluated collection.
    pub group_index: usize,
    pub title: String,
    pub severity: Severity,
    /// Detour waypoints to splice between origin and destination. Empty
    /// when no viable detour exists; the route is then left as-is.
    pub waypoints: Vec<GeoPoint>,
}

/// Walk hazard groups in caller order and stop at the first group whose
/// boundary the route crosses.
///
/// A cheap bounding-box check skips groups the route never enters.
/// Remaining groups after a match are not evaluated; the caller reroutes
/// around the first blocking hazard and re-checks the new route. Groups
/// with no polygons are skipped.
pub fn evaluate_hazards(
    route: &[GeoPoint],
    groups: &[HazardGroup],
    config: &DetourConfig,
) -> Option<HazardMatch> {
    for (group_index, group) in groups.iter().enumerate() {
        if group.polygons.is_empty() {
            continue;
        }
        if !route.iter().any(|point| group.bbox.contains(point)) {
            continue;
        }
        tracing::debug!(title = %group.title, "route enters hazard bounding box");

        for polygon in &group.polygons {
            if intersects(route, polygon) {
                tracing::info!(
                    title = %group.title,
                    severity = ?group.severity,
                    "route crosses hazard polygon"
                );
                let waypoints = compute_detour_waypoints_with(route, polygon, config);
                return Some(HazardMatch {
                    group_index,
                    title: group.title.clone(),
                    severity: group.severity,
                    waypoints,
                });
            }
        }
    }
    None
}
