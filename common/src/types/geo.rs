use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geocoordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// The courier device's most recently observed geocoordinate. Ephemeral,
/// superseded value: only the latest matters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LivePosition {
    pub point: GeoPoint,
    pub observed_at: DateTime<Utc>,
}

impl LivePosition {
    pub fn now(point: GeoPoint) -> Self {
        Self {
            point,
            observed_at: Utc::now(),
        }
    }
}
