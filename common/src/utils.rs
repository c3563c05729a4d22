use crate::constants::EARTH_RADIUS_METERS;
use crate::types::geo::GeoPoint;

/// Parses one stringified decimal-degree coordinate as stored by the backend.
/// Returns `None` for anything that is not a finite float; callers log the
/// miss in dev builds and render "no data" instead of crashing.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

pub fn parse_point(latitude: &str, longitude: &str) -> Option<GeoPoint> {
    Some(GeoPoint {
        latitude: parse_coordinate(latitude)?,
        longitude: parse_coordinate(longitude)?,
    })
}

/// Great-circle distance in meters between two decimal-degree points.
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}
