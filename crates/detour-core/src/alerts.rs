//! Weather-alert ingestion: converts an alert feed into hazard groups.
//!
//! The feed format mirrors NWS-style alert exports: each alert carries an
//! activity window, a severity label and one or more GeoJSON polygon
//! geometries with positions in [lon, lat] order.

use crate::models::{GeoPoint, HazardGroup, HazardPolygon, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert titles containing these keywords target watercraft or aircraft
/// and are irrelevant to road routing.
const EXCLUDED_TITLE_KEYWORDS: &[&str] = &["Craft", "Gale"];

/// One polygon geometry attached to an alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertGeometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    /// Rings of [lon, lat] positions, GeoJSON order.
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

/// A single weather alert as delivered by the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub id: String,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub geometry: Vec<AlertGeometry>,
}

impl WeatherAlert {
    /// Whether the alert's activity window covers `now`. Missing bounds
    /// are treated as open.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| start <= now)
            && self.end.map_or(true, |end| now <= end)
    }

    fn targets_marine_or_air(&self) -> bool {
        EXCLUDED_TITLE_KEYWORDS
            .iter()
            .any(|keyword| self.title.contains(keyword))
    }
}

/// Convert an alert feed into evaluable hazard groups.
///
/// Inactive alerts, watercraft/aircraft alerts and alerts without any
/// usable polygon are dropped. Ring coordinates arrive as [lon, lat] and
/// leave as (lat, lon) `GeoPoint`s.
pub fn hazard_groups(alerts: &[WeatherAlert], now: DateTime<Utc>) -> Vec<HazardGroup> {
    let mut groups = Vec::new();
    for alert in alerts {
        if alert.targets_marine_or_air() {
            tracing::debug!(id = %alert.id, title = %alert.title, "skipping marine/air alert");
            continue;
        }
        if !alert.is_active(now) {
            tracing::debug!(id = %alert.id, "skipping inactive alert");
            continue;
        }

        let mut polygons = Vec::new();
        for geometry in &alert.geometry {
            for ring in &geometry.coordinates {
                let vertices: Vec<GeoPoint> = ring
                    .iter()
                    .map(|position| GeoPoint::new(position[1], position[0]))
                    .collect();
                if !vertices.is_empty() {
                    polygons.push(HazardPolygon::new(vertices, alert.severity));
                }
            }
        }

        if !polygons.is_empty() {
            groups.push(HazardGroup::new(
                alert.title.clone(),
                alert.severity,
                polygons,
            ));
        }
    }
    groups
}
