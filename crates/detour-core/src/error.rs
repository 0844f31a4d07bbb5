//! Failure modes of detour construction.
//!
//! None of these abort the caller's routing flow; every error resolves to
//! "produce no detour, leave the route as-is".

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetourError {
    /// Polygon ring has too few vertices to project entry/exit points onto.
    #[error("polygon ring has {vertices} vertices, need at least 2 to slice boundary arcs")]
    DegenerateRing { vertices: usize },

    /// Simplification collapsed the arc below the 2-coordinate minimum.
    #[error("simplification collapsed the arc to {points} coordinate(s)")]
    InvalidSimplification { points: usize },
}
