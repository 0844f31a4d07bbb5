//! Core data models for hazard-aware route correction.

use serde::{Deserialize, Serialize};

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar view of the point as (x, y) = (longitude, latitude).
    ///
    /// All linear algebra and topology in this crate runs in this order;
    /// callers only ever see (lat, lon).
    pub(crate) fn xy(&self) -> (f64, f64) {
        (self.lon, self.lat)
    }

    pub(crate) fn from_xy(xy: (f64, f64)) -> Self {
        Self {
            lat: xy.1,
            lon: xy.0,
        }
    }
}

/// Axis-aligned bounding box over geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Degenerate box at the origin, used for empty geometry.
    pub const ZERO: BoundingBox = BoundingBox {
        min_lat: 0.0,
        max_lat: 0.0,
        min_lon: 0.0,
        max_lon: 0.0,
    };

    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = BoundingBox {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lon: first.lon,
            max_lon: first.lon,
        };
        for point in &points[1..] {
            bbox.min_lat = bbox.min_lat.min(point.lat);
            bbox.max_lat = bbox.max_lat.max(point.lat);
            bbox.min_lon = bbox.min_lon.min(point.lon);
            bbox.max_lon = bbox.max_lon.max(point.lon);
        }
        Some(bbox)
    }

    /// Cheap prefilter used before the full polygon intersection test.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lon >= self.min_lon
            && point.lon <= self.max_lon
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }
}

/// Alert severity, ordered from least to most severe.
///
/// Feed values outside the known set (e.g. "Extreme") map to `Unknown`,
/// which sorts above everything so unclassified hazards are not ranked
/// below real ones.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A polygonal region to avoid, with its precomputed bounding box.
///
/// The vertex ring is not required to be closed; operations that need a
/// closed ring close it internally. Rings with fewer than 3 vertices are
/// inert and never intersect anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardPolygon {
    pub ring: Vec<GeoPoint>,
    pub bbox: BoundingBox,
    pub severity: Severity,
}

impl HazardPolygon {
    pub fn new(ring: Vec<GeoPoint>, severity: Severity) -> Self {
        let bbox = BoundingBox::from_points(&ring).unwrap_or(BoundingBox::ZERO);
        Self {
            ring,
            bbox,
            severity,
        }
    }
}

/// A named collection of hazard polygons sharing a title and severity.
///
/// The bounding box is the union of the member boxes. Groups with no
/// polygons are never considered for intersection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardGroup {
    pub title: String,
    pub severity: Severity,
    pub polygons: Vec<HazardPolygon>,
    pub bbox: BoundingBox,
}

impl HazardGroup {
    pub fn new(title: impl Into<String>, severity: Severity, polygons: Vec<HazardPolygon>) -> Self {
        let bbox = polygons
            .iter()
            .map(|polygon| polygon.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or(BoundingBox::ZERO);
        Self {
            title: title.into(),
            severity,
            polygons,
            bbox,
        }
    }
}
