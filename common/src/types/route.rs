use serde::{Deserialize, Serialize};

use crate::types::geo::GeoPoint;

/// The inputs a quote was computed for. Kept on the quote so a response that
/// comes back after its inputs were superseded can be recognized and dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub waypoints: Vec<GeoPoint>,
}

/// A computed path with total duration and distance. Ephemeral: recomputed
/// whenever its inputs change, replaced whole, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteQuote {
    pub polyline: Vec<GeoPoint>,
    pub duration_secs: f64,
    pub distance_meters: f64,
    pub computed_for: RouteRequest,
}
