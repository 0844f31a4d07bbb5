pub mod alerts;
pub mod detour;
pub mod error;
pub mod evaluate;
pub mod intersect;
pub mod models;
pub mod spatial;

pub use alerts::{hazard_groups, AlertGeometry, WeatherAlert};
pub use detour::{
    compute_detour_waypoints, compute_detour_waypoints_with, locate_entry_exit, scale_outward,
    shortest_arc, simplify, try_compute_detour, DetourConfig,
};
pub use error::DetourError;
pub use evaluate::{evaluate_hazards, HazardMatch};
pub use intersect::intersects;
pub use models::{BoundingBox, GeoPoint, HazardGroup, HazardPolygon, Severity};
pub use spatial::haversine_distance;
